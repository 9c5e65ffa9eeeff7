//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Holds the [`Dispatcher`] (and through it the
//! [`AgentService`] and its session store) plus the agent's configuration.

use std::sync::Arc;

use kyc_core::CredentialDefinition;
use kyc_protocol::{
    EnvelopeBuilder, FeatureDiscovery, MessageValidator, PackageManager, PlainPacker,
    PlaintextPolicy, ZkpPacker,
};
use kyc_providers::{
    ConfigError, HttpProofVerifier, IssuerNodeClient, ProviderConfig, ProviderError, SynapsClient,
};
use kyc_session::ReplyFactory;

use crate::dispatch::Dispatcher;
use crate::service::AgentService;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Public URL of this agent, without trailing slash. Proposal and
    /// pending-offer URLs point here.
    pub agent_url: String,
    /// `ENV=development`: every message type may arrive as plain JSON.
    pub development: bool,
}

impl AppConfig {
    /// Load from `PORT` (default 3000), `AGENT_URL` (required) and `ENV`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "PORT".to_string(),
                reason: format!("'{raw}' is not a port number"),
            })?,
            Err(_) => DEFAULT_PORT,
        };
        let agent_url = match std::env::var("AGENT_URL") {
            Ok(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => return Err(ConfigError::Missing("AGENT_URL".to_string())),
        };
        let development = std::env::var("ENV").is_ok_and(|env| env == "development");
        Ok(Self {
            port,
            agent_url,
            development,
        })
    }

    pub fn plaintext_policy(&self) -> PlaintextPolicy {
        if self.development {
            PlaintextPolicy::AnyMessage
        } else {
            PlaintextPolicy::DiscoveryOnly
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config,
        }
    }

    /// The session orchestration behind the dispatcher.
    pub fn service(&self) -> &Arc<AgentService> {
        self.dispatcher.service()
    }

    /// Wire the agent to its upstream services.
    ///
    /// The agent receives messages as the issuer DID. The plain packer is
    /// always registered; the ZK packer only when a proof verifier is
    /// configured.
    pub fn from_providers(config: AppConfig, providers: ProviderConfig) -> Result<Self, ProviderError> {
        let agent_did = providers.issuer.issuer_did.clone();
        let credential = CredentialDefinition::proof_of_liveness();

        let verification = SynapsClient::new(providers.verification)?;
        let issuer = IssuerNodeClient::new(providers.issuer)?;
        let replies = ReplyFactory::new(
            config.agent_url.clone(),
            issuer.base_url(),
            agent_did.clone(),
            credential.clone(),
        );

        let mut packers = PackageManager::new().with_packer(Arc::new(PlainPacker));
        if let Some(verifier) = providers.proof_verifier {
            packers.register(Arc::new(ZkpPacker::new(Arc::new(HttpProofVerifier::new(
                verifier,
            )?))));
        }

        let service = AgentService::new(
            Arc::new(verification),
            Arc::new(issuer),
            replies,
            EnvelopeBuilder::new(agent_did.clone()),
            credential.clone(),
        );
        let validator = MessageValidator::new(agent_did, credential)
            .with_plaintext_policy(config.plaintext_policy());
        let dispatcher = Dispatcher::new(
            packers,
            validator,
            Arc::new(FeatureDiscovery::default()),
            Arc::new(service),
        );

        Ok(Self::new(config, dispatcher))
    }
}
