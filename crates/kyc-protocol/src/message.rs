//! # Protocol Messages
//!
//! Wire types for the iden3comm messages this agent exchanges.
//!
//! [`BasicMessage`] is the untrusted, structurally-decoded envelope exactly as
//! it came off the transport: every field may be missing or empty. Only the
//! validator turns it into an [`InboundMessage`], whose headers carry typed,
//! non-empty identifiers.

use kyc_core::{Did, ExternalSessionId, ThreadId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::discovery::DiscoveryQueryBody;

/// Protocol message type URIs.
pub mod message_type {
    /// Holder asks for a credential proposal.
    pub const PROPOSAL_REQUEST: &str =
        "https://iden3-communication.io/credentials/0.1/proposal-request";
    /// Agent proposes how the holder can obtain the credential.
    pub const PROPOSAL: &str = "https://iden3-communication.io/credentials/0.1/proposal";
    /// Holder asks for the credential of a verification session.
    pub const CREDENTIAL_FETCH_REQUEST: &str =
        "https://iden3-communication.io/credentials/1.0/fetch-request";
    /// Agent reports the state of, or presents, the credential.
    pub const CREDENTIAL_OFFER: &str = "https://iden3-communication.io/credentials/1.0/offer";
    /// Feature discovery query.
    pub const DISCOVERY_QUERIES: &str = "https://didcomm.org/discover-features/2.0/queries";
    /// Feature discovery answer.
    pub const DISCOVERY_DISCLOSE: &str = "https://didcomm.org/discover-features/2.0/disclose";
}

/// Transport envelope media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    /// Unsigned JSON message.
    #[serde(rename = "application/iden3comm-plain-json")]
    PlainMessage,
    /// Message wrapped in a zero-knowledge authentication token.
    #[serde(rename = "application/iden3-zkp-json")]
    ZkpMessage,
    /// Message wrapped in a JWS.
    #[serde(rename = "application/iden3comm-signed-json")]
    SignedMessage,
}

impl MediaType {
    /// Return the media type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainMessage => "application/iden3comm-plain-json",
            Self::ZkpMessage => "application/iden3-zkp-json",
            Self::SignedMessage => "application/iden3comm-signed-json",
        }
    }

    /// Parse a media type string.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "application/iden3comm-plain-json" => Some(Self::PlainMessage),
            "application/iden3-zkp-json" => Some(Self::ZkpMessage),
            "application/iden3comm-signed-json" => Some(Self::SignedMessage),
            _ => None,
        }
    }

    /// Whether the transport authenticates the sender.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::PlainMessage)
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structurally decoded, not yet validated, protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thid: Option<String>,
    #[serde(default)]
    pub body: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// Validated envelope fields shared by every inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    /// Sender-assigned message id (may be empty; not used for correlation).
    pub id: String,
    pub from: Did,
    pub to: Did,
    pub thid: ThreadId,
}

/// A credential named in a proposal request or proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialInfo {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub context: String,
}

/// Service entry of a DID document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DidService {
    #[serde(default)]
    pub id: Option<String>,
    /// A single type string or an array of them.
    #[serde(rename = "type", default)]
    pub service_type: Value,
    #[serde(rename = "serviceEndpoint", default)]
    pub service_endpoint: Option<Value>,
}

impl DidService {
    /// Whether this service declares `service_type`.
    pub fn is_type(&self, service_type: &str) -> bool {
        match &self.service_type {
            Value::String(s) => s == service_type,
            Value::Array(types) => types.iter().any(|t| t.as_str() == Some(service_type)),
            _ => false,
        }
    }
}

/// The subset of a holder's DID document the agent inspects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DidDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub service: Option<Vec<DidService>>,
}

/// Body of a proposal request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalRequestBody {
    #[serde(default)]
    pub credentials: Vec<CredentialInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did_doc: Option<DidDocument>,
}

/// Body of a credential fetch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialFetchBody {
    #[serde(default)]
    pub id: String,
}

/// A validated proposal request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalRequest {
    pub header: MessageHeader,
    pub body: ProposalRequestBody,
}

/// A validated credential fetch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFetchRequest {
    pub header: MessageHeader,
    /// The verification session whose credential is requested.
    pub session_id: ExternalSessionId,
}

/// A validated inbound message, one variant per handled protocol message.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    DiscoveryQuery {
        header: MessageHeader,
        body: DiscoveryQueryBody,
    },
    ProposalRequest(ProposalRequest),
    CredentialFetchRequest(CredentialFetchRequest),
    /// A well-formed envelope of a type this agent does not handle.
    Unknown {
        header: MessageHeader,
        message_type: String,
    },
}

impl InboundMessage {
    /// The validated envelope header.
    pub fn header(&self) -> &MessageHeader {
        match self {
            Self::DiscoveryQuery { header, .. } | Self::Unknown { header, .. } => header,
            Self::ProposalRequest(req) => &req.header,
            Self::CredentialFetchRequest(req) => &req.header,
        }
    }
}
