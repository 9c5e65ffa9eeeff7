//! Upstream client error types.

/// Errors from upstream service calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The call did not complete within the configured timeout.
    #[error("{endpoint} timed out")]
    Timeout { endpoint: String },
    /// The service returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The verification provider reported a status this agent does not know.
    #[error("{endpoint} reported unknown session status '{status}'")]
    UnknownStatus { endpoint: String, status: String },
    /// The verification provider opened a session but returned no id.
    #[error("{endpoint} returned no session id")]
    MissingSessionId { endpoint: String },
    /// The issuance backend accepted the request but returned no credential id.
    #[error("{endpoint} returned no credential id")]
    MissingCredentialId { endpoint: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl ProviderError {
    /// Classify a `reqwest` transport error.
    pub(crate) fn transport(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        let endpoint = endpoint.into();
        if source.is_timeout() {
            Self::Timeout { endpoint }
        } else {
            Self::Http { endpoint, source }
        }
    }

    /// Whether a later attempt may succeed: transport failures, timeouts and
    /// 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } | Self::Timeout { .. } | Self::UnknownStatus { .. } => true,
            Self::ApiError { status, .. } => *status >= 500,
            Self::Deserialization { .. }
            | Self::MissingSessionId { .. }
            | Self::MissingCredentialId { .. }
            | Self::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient_client_errors_are_not() {
        let server = ProviderError::ApiError {
            endpoint: "GET /x".into(),
            status: 503,
            body: String::new(),
        };
        let client = ProviderError::ApiError {
            endpoint: "GET /x".into(),
            status: 404,
            body: String::new(),
        };
        assert!(server.is_transient());
        assert!(!client.is_transient());
        assert!(ProviderError::Timeout { endpoint: "GET /x".into() }.is_transient());
        assert!(!ProviderError::MissingCredentialId { endpoint: "POST /y".into() }.is_transient());
    }
}
