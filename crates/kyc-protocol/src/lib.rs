//! # kyc-protocol: iden3comm Protocol Layer
//!
//! Everything between the raw bytes of `POST /agent` and a typed message the
//! agent can act on, and back again:
//!
//! ```text
//! bytes ─► PackageManager ─► UnpackedMessage ─► MessageValidator ─► InboundMessage
//!                                                                         │
//! BasicMessage ◄── EnvelopeBuilder ◄── OutboundMessage ◄──────── (agent) ◄┘
//! ```
//!
//! - [`packer`] detects the transport media type and unpacks the envelope.
//!   Proof verification for ZK tokens is delegated to a [`ProofVerifier`].
//! - [`validate`] applies the media-type policy, the envelope checks and the
//!   proposal-request checks, producing an [`InboundMessage`].
//! - [`envelope`] wraps an [`OutboundMessage`] into a reply envelope.
//! - [`discovery`] answers `discover-features` queries.
//!
//! Inbound and outbound messages are closed enums: adding a protocol message
//! means adding a variant, and every `match` over them must handle it.

pub mod discovery;
pub mod envelope;
pub mod error;
pub mod message;
pub mod packer;
pub mod validate;

pub use discovery::{DiscoveryHandler, DiscoveryQueryBody, FeatureDiscovery};
pub use envelope::{
    CredentialOfferBody, Envelope, EnvelopeBuilder, OfferStatus, OutboundMessage, Proposal,
    ProposalBody,
};
pub use error::ProtocolError;
pub use message::{
    message_type, BasicMessage, CredentialFetchRequest, CredentialInfo, DidDocument, DidService,
    InboundMessage, MediaType, MessageHeader, ProposalRequest, ProposalRequestBody,
};
pub use packer::{
    PackageManager, Packer, PlainPacker, ProofVerifier, UnpackedMessage, ZkpPacker, ZkpToken,
};
pub use validate::{MessageValidator, PlaintextPolicy};
