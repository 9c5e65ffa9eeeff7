//! Feature discovery (`discover-features/2.0`).
//!
//! A holder may ask which protocol messages the agent understands before
//! starting a conversation. Queries are the only messages accepted over a
//! plaintext transport in production.

use serde::{Deserialize, Serialize};

use crate::envelope::OutboundMessage;
use crate::message::message_type;

/// Feature type for protocol message URIs.
pub const FEATURE_TYPE_PROTOCOL: &str = "protocol";

/// One entry of a discovery query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureQuery {
    #[serde(rename = "feature-type")]
    pub feature_type: String,
    /// Exact feature id, or a prefix followed by `*`.
    #[serde(rename = "match", default)]
    pub pattern: String,
}

/// Body of a `queries` message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryQueryBody {
    #[serde(default)]
    pub queries: Vec<FeatureQuery>,
}

/// One disclosed feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disclosure {
    #[serde(rename = "feature-type")]
    pub feature_type: String,
    pub id: String,
}

/// Body of a `disclose` message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscloseBody {
    pub disclosures: Vec<Disclosure>,
}

/// Answers discovery queries.
pub trait DiscoveryHandler: Send + Sync {
    /// Build the reply to a discovery query.
    fn disclose(&self, query: &DiscoveryQueryBody) -> OutboundMessage;
}

/// Discloses a fixed list of protocol message types.
#[derive(Debug, Clone)]
pub struct FeatureDiscovery {
    protocols: Vec<String>,
}

impl FeatureDiscovery {
    pub fn new(protocols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            protocols: protocols.into_iter().map(Into::into).collect(),
        }
    }

    fn matches(pattern: &str, id: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => id.starts_with(prefix),
            None => pattern == id,
        }
    }
}

impl Default for FeatureDiscovery {
    /// The credential protocol messages this agent sends and receives.
    fn default() -> Self {
        Self::new([
            message_type::PROPOSAL_REQUEST,
            message_type::PROPOSAL,
            message_type::CREDENTIAL_FETCH_REQUEST,
            message_type::CREDENTIAL_OFFER,
            message_type::DISCOVERY_QUERIES,
            message_type::DISCOVERY_DISCLOSE,
        ])
    }
}

impl DiscoveryHandler for FeatureDiscovery {
    fn disclose(&self, query: &DiscoveryQueryBody) -> OutboundMessage {
        let mut disclosures: Vec<Disclosure> = Vec::new();
        for q in query
            .queries
            .iter()
            .filter(|q| q.feature_type == FEATURE_TYPE_PROTOCOL)
        {
            for id in self.protocols.iter().filter(|id| Self::matches(&q.pattern, id)) {
                if !disclosures.iter().any(|d| &d.id == id) {
                    disclosures.push(Disclosure {
                        feature_type: FEATURE_TYPE_PROTOCOL.to_string(),
                        id: id.clone(),
                    });
                }
            }
        }
        OutboundMessage::Disclose(DiscloseBody { disclosures })
    }
}
