//! # Agent Error Types
//!
//! [`AgentError`] is the failure taxonomy of the agent's flows. [`AppError`]
//! wraps it for the HTTP surface and implements `IntoResponse`, mapping each
//! variant to a status code and a JSON body `{"error":{"code","message"}}`.
//!
//! Upstream and internal failure details are logged, never returned.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use kyc_protocol::ProtocolError;
use kyc_providers::ProviderError;
use kyc_session::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Seconds a holder is asked to wait before polling again after an
/// upstream outage.
pub const RETRY_AFTER_SECS: u64 = 5;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "INVALID_MESSAGE", "SESSION_NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Failures of the protocol and session flows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// Malformed or out-of-policy message: missing routing fields, wrong
    /// recipient, unsupported credential.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The message type may not arrive over the transport it used.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The payload could not be unpacked at all.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The ZK proof did not authenticate the sender.
    #[error("proof rejected: {0}")]
    ProofRejected(String),

    /// No session has the requested external session id.
    #[error("no session for external session id {0}")]
    SessionNotFound(String),

    /// Timeout, transport failure or 5xx from an upstream service. The
    /// holder may poll again.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// An upstream service refused the request.
    #[error("upstream rejected request: {0}")]
    UpstreamRejected(String),

    /// The issuance backend answered without a credential id.
    #[error("credential issuance failed: {0}")]
    IssuanceFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Classify an upstream client failure.
    pub fn from_provider(err: ProviderError) -> Self {
        match &err {
            ProviderError::MissingCredentialId { .. } => Self::IssuanceFailed(err.to_string()),
            ProviderError::Config(_) => Self::Internal(err.to_string()),
            e if e.is_transient() => Self::UpstreamUnavailable(err.to_string()),
            _ => Self::UpstreamRejected(err.to_string()),
        }
    }
}

impl From<ProtocolError> for AgentError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidMessage(m) => Self::InvalidMessage(m),
            ProtocolError::UnsupportedMediaType(m) => Self::UnsupportedMediaType(m),
            ProtocolError::Unpack(m) => Self::MalformedEnvelope(m),
            ProtocolError::ProofRejected(m) => Self::ProofRejected(m),
            ProtocolError::VerifierUnavailable(m) => Self::UpstreamUnavailable(m),
        }
    }
}

impl From<StoreError> for AgentError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Error type of the HTTP handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// The request itself is unusable (400).
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Agent(err) => match err {
                AgentError::InvalidMessage(_) => (StatusCode::BAD_REQUEST, "INVALID_MESSAGE"),
                AgentError::UnsupportedMediaType(_) => {
                    (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA_TYPE")
                }
                AgentError::MalformedEnvelope(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                AgentError::ProofRejected(_) => (StatusCode::UNAUTHORIZED, "PROOF_REJECTED"),
                AgentError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
                AgentError::UpstreamUnavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE")
                }
                AgentError::UpstreamRejected(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
                AgentError::IssuanceFailed(_) => (StatusCode::BAD_GATEWAY, "ISSUANCE_FAILED"),
                AgentError::Internal(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
        }
    }

    /// The message returned to the client. Upstream and internal details
    /// stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Agent(AgentError::UpstreamUnavailable(_)) => {
                "An upstream service is temporarily unavailable; poll again later".to_string()
            }
            Self::Agent(AgentError::UpstreamRejected(_)) => {
                "An upstream service rejected the request".to_string()
            }
            Self::Agent(AgentError::IssuanceFailed(_)) => {
                "Credential issuance failed; poll again to retry".to_string()
            }
            Self::Agent(AgentError::Internal(_)) => "An internal error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.public_message();

        match &self {
            Self::Agent(AgentError::Internal(_)) => {
                tracing::error!(error = %self, "internal server error");
            }
            Self::Agent(
                AgentError::UpstreamUnavailable(_)
                | AgentError::UpstreamRejected(_)
                | AgentError::IssuanceFailed(_),
            ) => {
                tracing::warn!(error = %self, code, "upstream failure");
            }
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(RETRY_AFTER_SECS),
            );
        }
        response
    }
}
