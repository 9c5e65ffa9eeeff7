//! Typed client for the identity verification provider (Synaps).
//!
//! Endpoints:
//! - `POST /v4/session/init` opens a verification session aliased to the
//!   holder DID.
//! - `GET /v4/individual/session/{id}` reports the session's status.
//!
//! Both authenticate with the `Api-Key` header.

use async_trait::async_trait;
use kyc_core::{Did, ExternalSessionId};
use kyc_session::Status;
use serde::{Deserialize, Serialize};

use crate::config::VerificationConfig;
use crate::error::ProviderError;
use crate::retry::{retry_send, Replay};

/// Opens and reports on verification sessions.
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    /// Open a verification session for `did`.
    async fn create_session(&self, did: &Did) -> Result<ExternalSessionId, ProviderError>;

    /// Current status of a verification session.
    async fn session_status(&self, id: &ExternalSessionId) -> Result<Status, ProviderError>;
}

// -- Wire types ---------------------------------------------------------------

/// Body of `POST /v4/session/init`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitSessionRequest {
    #[serde(rename = "Alias")]
    pub alias: String,
}

/// Response of `POST /v4/session/init`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitSessionResponse {
    pub session_id: String,
    #[serde(default)]
    pub sandbox: bool,
}

/// Session entry of `GET /v4/individual/session/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetails {
    pub id: String,
    pub status: String,
}

/// Response of `GET /v4/individual/session/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetailsResponse {
    pub session: SessionDetails,
}

// -- Client -------------------------------------------------------------------

/// Client for the Synaps verification API.
#[derive(Debug, Clone)]
pub struct SynapsClient {
    http: reqwest::Client,
    base_url: String,
}

impl SynapsClient {
    pub fn new(config: VerificationConfig) -> Result<Self, ProviderError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut api_key = reqwest::header::HeaderValue::from_str(&config.api_key).map_err(|_| {
            crate::config::ConfigError::InvalidValue {
                var: "SYNAPS_API_KEY".to_string(),
                reason: "not a valid header value".to_string(),
            }
        })?;
        api_key.set_sensitive(true);
        headers.insert("Api-Key", api_key);

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// `POST /v4/session/init`.
    pub async fn init_session(&self, alias: &str) -> Result<InitSessionResponse, ProviderError> {
        let endpoint = "POST /v4/session/init";
        let url = format!("{}/v4/session/init", self.base_url);
        let req = InitSessionRequest {
            alias: alias.to_string(),
        };

        let resp = retry_send(endpoint, Replay::ConnectOnly, || {
            self.http.post(&url).json(&req).send()
        })
        .await
        .map_err(|e| ProviderError::transport(endpoint, e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| ProviderError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }

    /// `GET /v4/individual/session/{id}`.
    pub async fn session_details(
        &self,
        id: &ExternalSessionId,
    ) -> Result<SessionDetailsResponse, ProviderError> {
        let endpoint = format!("GET /v4/individual/session/{id}");
        let url = format!("{}/v4/individual/session/{id}", self.base_url);

        let resp = retry_send(&endpoint, Replay::Safe, || self.http.get(&url).send())
            .await
            .map_err(|e| ProviderError::transport(endpoint.clone(), e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                endpoint,
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| ProviderError::Deserialization {
            endpoint,
            source: e,
        })
    }
}

#[async_trait]
impl VerificationProvider for SynapsClient {
    async fn create_session(&self, did: &Did) -> Result<ExternalSessionId, ProviderError> {
        let resp = self.init_session(did.as_str()).await?;
        let id = ExternalSessionId::new(resp.session_id).map_err(|_| {
            ProviderError::MissingSessionId {
                endpoint: "POST /v4/session/init".into(),
            }
        })?;
        tracing::debug!(did = %did, external_session_id = %id, sandbox = resp.sandbox, "verification session opened");
        Ok(id)
    }

    async fn session_status(&self, id: &ExternalSessionId) -> Result<Status, ProviderError> {
        let details = self.session_details(id).await?;
        Status::from_name(&details.session.status).ok_or_else(|| ProviderError::UnknownStatus {
            endpoint: format!("GET /v4/individual/session/{id}"),
            status: details.session.status,
        })
    }
}
