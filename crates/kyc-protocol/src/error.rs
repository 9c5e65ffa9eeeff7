//! Protocol layer error types.

use thiserror::Error;

/// Errors raised while unpacking or validating an inbound message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Malformed or out-of-policy message: missing envelope fields, wrong
    /// recipient, unsupported credential, malformed body.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The transport media type is not registered, or is not acceptable for
    /// the message type it carried.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The envelope bytes could not be decoded at all.
    #[error("failed to unpack envelope: {0}")]
    Unpack(String),

    /// The proof attached to a ZK token did not verify.
    #[error("proof rejected: {0}")]
    ProofRejected(String),

    /// The proof verifier could not be reached or timed out.
    #[error("proof verifier unavailable: {0}")]
    VerifierUnavailable(String),
}

impl ProtocolError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidMessage(msg.into())
    }
}

impl From<kyc_core::ValidationError> for ProtocolError {
    fn from(err: kyc_core::ValidationError) -> Self {
        Self::InvalidMessage(err.to_string())
    }
}
