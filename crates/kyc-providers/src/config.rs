//! Upstream service configuration.
//!
//! Base URLs and credentials for each upstream service, loaded from the
//! environment. Custom `Debug` implementations redact secrets so that
//! configurations can be logged at start-up.

use kyc_core::Did;
use url::Url;

/// Default per-attempt timeout for upstream calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Verification provider (Synaps) configuration.
#[derive(Clone)]
pub struct VerificationConfig {
    pub base_url: Url,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for VerificationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Issuance backend (issuer node) configuration.
#[derive(Clone)]
pub struct IssuerConfig {
    pub base_url: Url,
    /// The issuer identity credentials are minted under. Also the DID this
    /// agent receives messages as.
    pub issuer_did: Did,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for IssuerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerConfig")
            .field("base_url", &self.base_url)
            .field("issuer_did", &self.issuer_did)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// ZK proof verification service configuration.
#[derive(Debug, Clone)]
pub struct ProofVerifierConfig {
    pub url: Url,
    /// DID-state RPC endpoint forwarded with every verification request.
    pub rpc_url: Option<String>,
    /// DID-state contract address forwarded with every verification request.
    pub contract_address: Option<String>,
    pub timeout_secs: u64,
}

/// All upstream configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub verification: VerificationConfig,
    pub issuer: IssuerConfig,
    /// `None` when no proof verifier is configured; ZK envelopes are then
    /// rejected as an unsupported media type.
    pub proof_verifier: Option<ProofVerifierConfig>,
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SYNAPS_API_URL`, `SYNAPS_API_KEY` (required)
    /// - `ISSUER_API_AGENT_URL`, `ISSUER_DID`, `ISSUER_API_USER_NAME`,
    ///   `ISSUER_API_PASSWORD` (required)
    /// - `PROOF_VERIFIER_URL` (optional), with `RPC_URL` and
    ///   `CONTRACT_ADDRESS` forwarded to it
    /// - `PROVIDER_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = match std::env::var("PROVIDER_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "PROVIDER_TIMEOUT_SECS".to_string(),
                reason: format!("'{raw}' is not a number of seconds"),
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let issuer_did = Did::new(required("ISSUER_DID")?).map_err(|e| {
            ConfigError::InvalidValue {
                var: "ISSUER_DID".to_string(),
                reason: e.to_string(),
            }
        })?;

        let proof_verifier = match std::env::var("PROOF_VERIFIER_URL") {
            Ok(_) => Some(ProofVerifierConfig {
                url: required_url("PROOF_VERIFIER_URL")?,
                rpc_url: std::env::var("RPC_URL").ok(),
                contract_address: std::env::var("CONTRACT_ADDRESS").ok(),
                timeout_secs,
            }),
            Err(_) => None,
        };

        Ok(Self {
            verification: VerificationConfig {
                base_url: required_url("SYNAPS_API_URL")?,
                api_key: required("SYNAPS_API_KEY")?,
                timeout_secs,
            },
            issuer: IssuerConfig {
                base_url: required_url("ISSUER_API_AGENT_URL")?,
                issuer_did,
                username: required("ISSUER_API_USER_NAME")?,
                password: required("ISSUER_API_PASSWORD")?,
                timeout_secs,
            },
            proof_verifier,
        })
    }

    /// Configuration pointing both services at one local server, such as
    /// `kyc-provider-stub`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be parsed.
    pub fn local_mock(port: u16, issuer_did: Did) -> Result<Self, ConfigError> {
        let url = Url::parse(&format!("http://127.0.0.1:{port}"))
            .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?;
        Ok(Self {
            verification: VerificationConfig {
                base_url: url.clone(),
                api_key: "test-api-key".to_string(),
                timeout_secs: 5,
            },
            issuer: IssuerConfig {
                base_url: url,
                issuer_did,
                username: "user".to_string(),
                password: "password".to_string(),
                timeout_secs: 5,
            },
            proof_verifier: None,
        })
    }
}

fn required(var: &str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var.to_string())),
    }
}

fn required_url(var: &str) -> Result<Url, ConfigError> {
    let raw = required(var)?;
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}
