//! # kyc-providers: Upstream Service Clients
//!
//! Typed HTTP access to the services the agent delegates to:
//! - **Verification provider** (Synaps): opens liveness sessions and reports
//!   their status. See [`verification`].
//! - **Issuance backend** (issuer node): mints the credential once a session
//!   is approved. See [`issuance`].
//! - **Proof verifier**: checks ZK tokens on behalf of the transport packer.
//!   See [`proof`].
//!
//! The agent depends on the [`VerificationProvider`] and [`CredentialIssuer`]
//! traits, so its orchestration is tested against in-process doubles while
//! the clients here are contract-tested against `wiremock`.
//!
//! Every client carries a per-attempt timeout and retries transport failures
//! with exponential backoff (see `retry`).

pub mod config;
pub mod error;
pub mod issuance;
pub mod proof;
pub(crate) mod retry;
pub mod verification;

pub use config::{ConfigError, IssuerConfig, ProofVerifierConfig, ProviderConfig, VerificationConfig};
pub use error::ProviderError;
pub use issuance::{CredentialIssuer, IssuerNodeClient};
pub use proof::HttpProofVerifier;
pub use verification::{SynapsClient, VerificationProvider};
