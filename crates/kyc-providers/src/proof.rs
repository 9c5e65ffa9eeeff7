//! HTTP client for the ZK proof verification service.
//!
//! The agent does not verify zero-knowledge proofs itself. Each ZK token is
//! posted to the configured verifier together with the DID-state network
//! settings; the verifier answers whether the proof holds and which DID it
//! authenticates.

use async_trait::async_trait;
use kyc_protocol::{ProofVerifier, ProtocolError, ZkpToken};
use serde::{Deserialize, Serialize};

use crate::config::ProofVerifierConfig;
use crate::error::ProviderError;
use crate::retry::{retry_send, Replay};

/// Body posted to the verifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyProofRequest {
    pub token: String,
    pub circuit_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

/// Verifier answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyProofResponse {
    pub verified: bool,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// [`ProofVerifier`] backed by an HTTP verification service.
#[derive(Debug, Clone)]
pub struct HttpProofVerifier {
    http: reqwest::Client,
    url: String,
    rpc_url: Option<String>,
    contract_address: Option<String>,
}

impl HttpProofVerifier {
    pub fn new(config: ProofVerifierConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            url: config.url.to_string(),
            rpc_url: config.rpc_url,
            contract_address: config.contract_address,
        })
    }

    /// Post a token to the verifier.
    pub async fn verify_token(
        &self,
        req: &VerifyProofRequest,
    ) -> Result<VerifyProofResponse, ProviderError> {
        let endpoint = "POST proof verifier";
        let resp = retry_send(endpoint, Replay::Safe, || {
            self.http.post(&self.url).json(req).send()
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
}

#[async_trait]
impl ProofVerifier for HttpProofVerifier {
    async fn verify(&self, token: &ZkpToken) -> Result<Option<String>, ProtocolError> {
        let req = VerifyProofRequest {
            token: token.as_compact().to_string(),
            circuit_id: token.header.circuit_id.clone(),
            rpc_url: self.rpc_url.clone(),
            contract_address: self.contract_address.clone(),
        };
        let resp = self.verify_token(&req).await.map_err(|e| {
            tracing::warn!(error = %e, "proof verification unavailable");
            ProtocolError::VerifierUnavailable(e.to_string())
        })?;
        if !resp.verified {
            return Err(ProtocolError::ProofRejected(
                resp.reason.unwrap_or_else(|| "proof did not verify".to_string()),
            ));
        }
        Ok(resp.sender)
    }
}
