//! Typed client for the credential issuance backend (issuer node).
//!
//! `POST /v2/identities/{issuerDid}/credentials` with HTTP Basic auth mints
//! a credential and returns its id.

use async_trait::async_trait;
use chrono::Utc;
use kyc_core::{CredentialDefinition, CredentialId, Did};
use serde::{Deserialize, Serialize};

use crate::config::IssuerConfig;
use crate::error::ProviderError;
use crate::retry::{retry_send, Replay};

/// Mints credentials for verified holders.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// Issue `credential` to `subject`.
    ///
    /// # Errors
    ///
    /// [`ProviderError::MissingCredentialId`] if the backend answered without
    /// an id; other variants for transport and API failures.
    async fn issue(
        &self,
        subject: &Did,
        credential: &CredentialDefinition,
    ) -> Result<CredentialId, ProviderError>;
}

// -- Wire types ---------------------------------------------------------------

/// Subject claims of an issued credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialSubject {
    pub id: String,
    pub human: bool,
}

/// Body of `POST /v2/identities/{did}/credentials`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCredentialRequest {
    pub credential_schema: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub credential_subject: CredentialSubject,
    /// Epoch seconds.
    pub expiration: i64,
}

impl CreateCredentialRequest {
    /// A liveness credential for `subject`, expiring after the standard
    /// validity window.
    pub fn for_subject(subject: &Did, credential: &CredentialDefinition) -> Self {
        Self {
            credential_schema: credential.schema.clone(),
            credential_type: credential.credential_type.clone(),
            credential_subject: CredentialSubject {
                id: subject.to_string(),
                human: true,
            },
            expiration: CredentialDefinition::expiration_after(Utc::now()),
        }
    }
}

/// Response of `POST /v2/identities/{did}/credentials`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCredentialResponse {
    #[serde(default)]
    pub id: Option<String>,
}

// -- Client -------------------------------------------------------------------

/// Client for the issuer node API.
#[derive(Clone)]
pub struct IssuerNodeClient {
    http: reqwest::Client,
    base_url: String,
    issuer_did: Did,
    username: String,
    password: String,
}

impl std::fmt::Debug for IssuerNodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerNodeClient")
            .field("base_url", &self.base_url)
            .field("issuer_did", &self.issuer_did)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl IssuerNodeClient {
    pub fn new(config: IssuerConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            issuer_did: config.issuer_did,
            username: config.username,
            password: config.password,
        })
    }

    /// Base URL of the issuer node, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The issuer identity credentials are minted under.
    pub fn issuer_did(&self) -> &Did {
        &self.issuer_did
    }

    /// `POST /v2/identities/{issuerDid}/credentials`.
    pub async fn create_credential(
        &self,
        req: &CreateCredentialRequest,
    ) -> Result<CreateCredentialResponse, ProviderError> {
        let endpoint = "POST /v2/identities/{did}/credentials";
        let url = format!(
            "{}/v2/identities/{}/credentials",
            self.base_url, self.issuer_did
        );

        let resp = retry_send(endpoint, Replay::ConnectOnly, || {
            self.http
                .post(&url)
                .basic_auth(&self.username, Some(&self.password))
                .json(req)
                .send()
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
impl CredentialIssuer for IssuerNodeClient {
    async fn issue(
        &self,
        subject: &Did,
        credential: &CredentialDefinition,
    ) -> Result<CredentialId, ProviderError> {
        let req = CreateCredentialRequest::for_subject(subject, credential);
        let resp = self.create_credential(&req).await?;
        resp.id
            .and_then(|id| CredentialId::new(id).ok())
            .ok_or_else(|| ProviderError::MissingCredentialId {
                endpoint: "POST /v2/identities/{did}/credentials".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_core::CREDENTIAL_VALIDITY_DAYS;

    #[test]
    fn request_wire_shape() {
        let did = Did::new("did:iden3:holder").unwrap();
        let req = CreateCredentialRequest::for_subject(&did, &CredentialDefinition::proof_of_liveness());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["type"], "AnimaProofOfLife");
        assert_eq!(
            value["credentialSchema"],
            CredentialDefinition::proof_of_liveness().schema
        );
        assert_eq!(value["credentialSubject"]["id"], "did:iden3:holder");
        assert_eq!(value["credentialSubject"]["human"], true);

        let window = req.expiration - Utc::now().timestamp();
        let expected = CREDENTIAL_VALIDITY_DAYS * 24 * 60 * 60;
        assert!((expected - 5..=expected).contains(&window));
    }
}
