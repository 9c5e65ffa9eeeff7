//! # kyc-session: Verification Session Lifecycle
//!
//! A session tracks one holder DID through the verification provider's
//! workflow until a credential is issued.
//!
//! ```text
//!                 provider reports
//! SUBMISSION_REQUIRED ──▶ PENDING_VERIFICATION ──▶ APPROVED ──issue──▶ (credential id set)
//!          ▲                       │                  │
//!          └───────────────────────┴──▶ REJECTED ◀────┘
//! ```
//!
//! The agent never decides the status itself; it mirrors whatever the
//! provider last reported. What it decides is the reply for each status and
//! whether a credential must be issued. That decision is the pure
//! [`machine::transition`] function, so it is tested without any network.
//!
//! - [`session`]: the [`Session`] record, [`Status`] and [`ClientType`].
//! - [`machine`]: the transition function.
//! - [`reply`]: builds the proposal and offer payloads for a session.
//! - [`store`]: the shared [`SessionStore`] with per-session serialization.

pub mod machine;
pub mod reply;
pub mod session;
pub mod store;

pub use machine::{transition, Step, Transition};
pub use reply::ReplyFactory;
pub use session::{ClientType, Session, Status};
pub use store::{SessionGuard, SessionStore, StoreError};
