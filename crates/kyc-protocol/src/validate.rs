//! # Message Validator
//!
//! Turns an [`UnpackedMessage`] into an [`InboundMessage`] or rejects it.
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. **Media-type policy.** Under [`PlaintextPolicy::DiscoveryOnly`] a
//!    message delivered as plain JSON is accepted only if it is a discovery
//!    query; anything else fails with
//!    [`ProtocolError::UnsupportedMediaType`].
//! 2. **Envelope.** `from`, `to` and `thid` must be non-empty and `to` must
//!    be the agent's own DID.
//! 3. **Body.** Proposal requests must name exactly one credential, and it
//!    must be the credential this agent issues. Fetch requests must carry a
//!    session id. Discovery queries must decode.
//!
//! Validation never touches session state or upstream services.

use kyc_core::{CredentialDefinition, Did, ExternalSessionId, ThreadId};
use serde_json::Value;

use crate::discovery::DiscoveryQueryBody;
use crate::error::ProtocolError;
use crate::message::{
    message_type, BasicMessage, CredentialFetchBody, CredentialFetchRequest, InboundMessage,
    MediaType, MessageHeader, ProposalRequest, ProposalRequestBody,
};
use crate::packer::UnpackedMessage;

/// Which message types may arrive over the unauthenticated plain transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaintextPolicy {
    /// Only discovery queries (production).
    #[default]
    DiscoveryOnly,
    /// Every message type (local development and testing).
    AnyMessage,
}

/// Validates inbound messages addressed to one agent DID.
#[derive(Debug, Clone)]
pub struct MessageValidator {
    agent_did: Did,
    credential: CredentialDefinition,
    plaintext_policy: PlaintextPolicy,
}

impl MessageValidator {
    pub fn new(agent_did: Did, credential: CredentialDefinition) -> Self {
        Self {
            agent_did,
            credential,
            plaintext_policy: PlaintextPolicy::default(),
        }
    }

    pub fn with_plaintext_policy(mut self, policy: PlaintextPolicy) -> Self {
        self.plaintext_policy = policy;
        self
    }

    pub fn plaintext_policy(&self) -> PlaintextPolicy {
        self.plaintext_policy
    }

    /// Apply the media-type policy to a message of `message_type`.
    pub fn check_media_type(
        &self,
        message_type: &str,
        media_type: MediaType,
    ) -> Result<(), ProtocolError> {
        if media_type.is_authenticated()
            || self.plaintext_policy == PlaintextPolicy::AnyMessage
            || message_type == message_type::DISCOVERY_QUERIES
        {
            return Ok(());
        }
        Err(ProtocolError::UnsupportedMediaType(format!(
            "{message_type} must not be sent as {media_type}"
        )))
    }

    /// Check the routing fields of an envelope.
    pub fn check_envelope(&self, msg: &BasicMessage) -> Result<MessageHeader, ProtocolError> {
        let from = non_empty(msg.from.as_deref(), "from")?;
        let to = non_empty(msg.to.as_deref(), "to")?;
        if to != self.agent_did.as_str() {
            return Err(ProtocolError::invalid(format!(
                "message is addressed to {to}, not to this agent"
            )));
        }
        let thid = non_empty(msg.thid.as_deref(), "thid")?;
        Ok(MessageHeader {
            id: msg.id.clone(),
            from: Did::new(from)?,
            to: Did::new(to)?,
            thid: ThreadId::new(thid)?,
        })
    }

    /// Check and decode a proposal request body.
    pub fn check_proposal_request(&self, body: &Value) -> Result<ProposalRequestBody, ProtocolError> {
        if body.is_null() {
            return Err(ProtocolError::invalid("proposal request body is missing"));
        }
        let body: ProposalRequestBody = decode_body(body, "proposal request")?;
        let [credential] = body.credentials.as_slice() else {
            return Err(ProtocolError::invalid(format!(
                "proposal request must name exactly one credential, found {}",
                body.credentials.len()
            )));
        };
        if !self
            .credential
            .matches(&credential.context, &credential.credential_type)
        {
            return Err(ProtocolError::invalid(format!(
                "unsupported credential {} ({})",
                credential.credential_type, credential.context
            )));
        }
        Ok(body)
    }

    /// Run every check and classify the message.
    pub fn validate(&self, unpacked: UnpackedMessage) -> Result<InboundMessage, ProtocolError> {
        let UnpackedMessage {
            message,
            media_type,
        } = unpacked;
        self.check_media_type(&message.message_type, media_type)?;
        let header = self.check_envelope(&message)?;

        let inbound = match message.message_type.as_str() {
            message_type::DISCOVERY_QUERIES => InboundMessage::DiscoveryQuery {
                header,
                body: if message.body.is_null() {
                    DiscoveryQueryBody::default()
                } else {
                    decode_body(&message.body, "discovery query")?
                },
            },
            message_type::PROPOSAL_REQUEST => {
                let body = self.check_proposal_request(&message.body)?;
                InboundMessage::ProposalRequest(ProposalRequest { header, body })
            }
            message_type::CREDENTIAL_FETCH_REQUEST => {
                let body: CredentialFetchBody = decode_body(&message.body, "fetch request")?;
                InboundMessage::CredentialFetchRequest(CredentialFetchRequest {
                    header,
                    session_id: ExternalSessionId::new(body.id)?,
                })
            }
            other => InboundMessage::Unknown {
                header,
                message_type: other.to_string(),
            },
        };
        Ok(inbound)
    }
}

fn non_empty<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ProtocolError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ProtocolError::invalid(format!("{field} is missing"))),
    }
}

fn decode_body<T: serde::de::DeserializeOwned>(body: &Value, what: &str) -> Result<T, ProtocolError> {
    serde_json::from_value(body.clone())
        .map_err(|e| ProtocolError::invalid(format!("malformed {what} body: {e}")))
}
