#![deny(missing_docs)]

//! # kyc-core: Foundational Types for the KYC Credential Agent
//!
//! This crate defines the types every other crate in the workspace shares.
//! It has no internal crate dependencies: only `serde`, `thiserror` and
//! `chrono` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** A holder [`Did`], a protocol
//!    [`ThreadId`], a provider-issued [`ExternalSessionId`] and an issued
//!    [`CredentialId`] are distinct types. You cannot poll a session with a
//!    thread id.
//!
//! 2. **One credential definition.** The agent issues exactly one kind of
//!    credential, described by [`CredentialDefinition`]. Proposal validation,
//!    proposal construction and the issuance request all read from it.

pub mod credential;
pub mod error;
pub mod identity;

pub use credential::{CredentialDefinition, CREDENTIAL_VALIDITY_DAYS};
pub use error::ValidationError;
pub use identity::{CredentialId, Did, ExternalSessionId, ThreadId};
