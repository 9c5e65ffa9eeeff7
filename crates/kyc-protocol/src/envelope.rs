//! # Outbound Envelopes
//!
//! Every reply the agent sends is one [`OutboundMessage`] variant sealed into
//! an [`Envelope`] by the [`EnvelopeBuilder`]: a fresh message id, the
//! agent's DID as sender, the holder's DID as recipient and the conversation's
//! thread id unchanged. The message type URI is derived from the variant, so
//! a payload can never be sent under the wrong type tag.

use kyc_core::{Did, ThreadId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::discovery::DiscloseBody;
use crate::message::{message_type, CredentialInfo, MediaType};

/// Proposal type advertised to holders.
pub const PROPOSAL_TYPE: &str = "SynapsCredentialProposal";

/// Proposal description shown to holders.
pub const PROPOSAL_DESCRIPTION: &str = "Synaps credential proposal";

/// One way for the holder to obtain a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub credentials: Vec<CredentialInfo>,
    #[serde(rename = "type")]
    pub proposal_type: String,
    pub url: String,
    pub description: String,
}

/// Body of a proposal message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalBody {
    pub proposals: Vec<Proposal>,
}

/// Credential state reported in an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Completed,
    Rejected,
}

/// A credential entry of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferedCredential {
    /// External session id while pending or rejected, credential id once
    /// completed.
    pub id: String,
    pub description: String,
    pub status: OfferStatus,
}

/// Body of a credential offer message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialOfferBody {
    /// Where the holder follows up: the agent while pending or rejected, the
    /// issuer's fetch endpoint once completed.
    pub url: String,
    pub credentials: Vec<OfferedCredential>,
}

impl CredentialOfferBody {
    /// An offer carrying a single credential entry.
    pub fn single(
        url: impl Into<String>,
        id: impl Into<String>,
        description: impl Into<String>,
        status: OfferStatus,
    ) -> Self {
        Self {
            url: url.into(),
            credentials: vec![OfferedCredential {
                id: id.into(),
                description: description.into(),
                status,
            }],
        }
    }

    /// Status of the first credential entry.
    pub fn status(&self) -> Option<OfferStatus> {
        self.credentials.first().map(|c| c.status)
    }
}

/// A reply payload. The message type tag follows from the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Proposal(ProposalBody),
    CredentialOffer(CredentialOfferBody),
    Disclose(DiscloseBody),
}

impl OutboundMessage {
    /// The protocol message type URI for this payload.
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::Proposal(_) => message_type::PROPOSAL,
            Self::CredentialOffer(_) => message_type::CREDENTIAL_OFFER,
            Self::Disclose(_) => message_type::DISCOVERY_DISCLOSE,
        }
    }
}

/// A sealed reply, serialized as the response body of `POST /agent` and
/// `GET /offers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: String,
    pub typ: MediaType,
    #[serde(rename = "type")]
    pub message_type: String,
    pub thid: ThreadId,
    pub body: OutboundMessage,
    pub from: Did,
    pub to: Did,
}

/// Seals outbound messages on behalf of one sender DID.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    from: Did,
}

impl EnvelopeBuilder {
    pub fn new(from: Did) -> Self {
        Self { from }
    }

    /// The DID every sealed envelope is sent from.
    pub fn sender(&self) -> &Did {
        &self.from
    }

    /// Wrap `body` into a plain envelope addressed to `to` on thread `thid`.
    pub fn seal(&self, to: Did, thid: ThreadId, body: OutboundMessage) -> Envelope {
        Envelope {
            id: Uuid::new_v4().to_string(),
            typ: MediaType::PlainMessage,
            message_type: body.message_type().to_string(),
            thid,
            body,
            from: self.from.clone(),
            to,
        }
    }
}
