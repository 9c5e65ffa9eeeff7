//! # Protocol Dispatcher
//!
//! Entry point of `POST /agent`: unpack the raw payload, validate it and
//! route it by message type.
//!
//! | Inbound message          | Action                                            |
//! |--------------------------|---------------------------------------------------|
//! | discovery query          | answer with the discovery handler's disclosure    |
//! | proposal request         | open or resume the sender's session               |
//! | credential fetch request | resume the session named in the body              |
//! | anything else            | diagnostic text naming the type (not an error)    |

use std::sync::Arc;

use kyc_protocol::{
    DiscoveryHandler, Envelope, InboundMessage, MessageValidator, PackageManager,
};

use crate::error::AgentError;
use crate::service::AgentService;

/// What `POST /agent` answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentReply {
    Envelope(Envelope),
    /// Soft answer for message types this agent does not handle.
    Diagnostic(String),
}

/// Routes inbound protocol messages.
pub struct Dispatcher {
    packers: PackageManager,
    validator: MessageValidator,
    discovery: Arc<dyn DiscoveryHandler>,
    service: Arc<AgentService>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("packers", &self.packers)
            .field("plaintext_policy", &self.validator.plaintext_policy())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(
        packers: PackageManager,
        validator: MessageValidator,
        discovery: Arc<dyn DiscoveryHandler>,
        service: Arc<AgentService>,
    ) -> Self {
        Self {
            packers,
            validator,
            discovery,
            service,
        }
    }

    pub fn service(&self) -> &Arc<AgentService> {
        &self.service
    }

    /// Handle one raw payload.
    ///
    /// Unpacking and validation failures are returned before any session is
    /// read or any upstream service is called.
    pub async fn dispatch(&self, raw: &[u8]) -> Result<AgentReply, AgentError> {
        let unpacked = self.packers.unpack(raw).await?;
        let media_type = unpacked.media_type;
        let inbound = self.validator.validate(unpacked)?;
        tracing::debug!(
            from = %inbound.header().from,
            thid = %inbound.header().thid,
            media_type = %media_type,
            "dispatching message"
        );

        match inbound {
            InboundMessage::DiscoveryQuery { header, body } => {
                let reply = self.discovery.disclose(&body);
                Ok(AgentReply::Envelope(
                    self.service
                        .envelopes()
                        .seal(header.from, header.thid, reply),
                ))
            }
            InboundMessage::ProposalRequest(request) => self
                .service
                .handle_proposal_request(request)
                .await
                .map(AgentReply::Envelope),
            InboundMessage::CredentialFetchRequest(request) => self
                .service
                .credential_offer_exchange(&request.session_id)
                .await
                .map(AgentReply::Envelope),
            InboundMessage::Unknown {
                header,
                message_type,
            } => {
                tracing::info!(from = %header.from, message_type = %message_type, "unknown message type");
                Ok(AgentReply::Diagnostic(format!(
                    "unknown message type {message_type}"
                )))
            }
        }
    }
}
