//! # Transport Packers
//!
//! The raw body of `POST /agent` is a packed envelope. Its media type is
//! detected from the envelope itself:
//!
//! - a JSON object carries it in its `typ` field (a plain message);
//! - a compact token (`header.payload.proof`, base64url parts) carries it in
//!   the `typ` field of its decoded header.
//!
//! The [`PackageManager`] dispatches to the [`Packer`] registered for that
//! media type. A media type with no registered packer is rejected with
//! [`ProtocolError::UnsupportedMediaType`].
//!
//! Zero-knowledge proofs are not verified here: the [`ZkpPacker`] hands the
//! parsed token to a [`ProofVerifier`] and only checks that the DID the proof
//! authenticates is the message's sender.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProtocolError;
use crate::message::{BasicMessage, MediaType};

/// A structurally unpacked message and the transport it arrived through.
#[derive(Debug, Clone, PartialEq)]
pub struct UnpackedMessage {
    pub message: BasicMessage,
    pub media_type: MediaType,
}

/// Unpacks envelopes of one media type.
#[async_trait]
pub trait Packer: Send + Sync {
    /// The media type this packer handles.
    fn media_type(&self) -> MediaType;

    /// Decode (and authenticate, where the media type requires it) an
    /// envelope.
    async fn unpack(&self, envelope: &[u8]) -> Result<BasicMessage, ProtocolError>;
}

/// Registry of packers keyed by media type.
#[derive(Clone, Default)]
pub struct PackageManager {
    packers: HashMap<MediaType, Arc<dyn Packer>>,
}

impl std::fmt::Debug for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageManager")
            .field("media_types", &self.media_types())
            .finish()
    }
}

impl PackageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a packer, replacing any packer for the same media type.
    pub fn register(&mut self, packer: Arc<dyn Packer>) {
        self.packers.insert(packer.media_type(), packer);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_packer(mut self, packer: Arc<dyn Packer>) -> Self {
        self.register(packer);
        self
    }

    /// Registered media types.
    pub fn media_types(&self) -> Vec<MediaType> {
        let mut types: Vec<MediaType> = self.packers.keys().copied().collect();
        types.sort_by_key(|t| t.as_str());
        types
    }

    /// Detect the media type of a packed envelope.
    pub fn detect_media_type(envelope: &[u8]) -> Result<MediaType, ProtocolError> {
        let text = std::str::from_utf8(envelope)
            .map_err(|_| ProtocolError::Unpack("envelope is not valid UTF-8".to_string()))?
            .trim();
        if text.is_empty() {
            return Err(ProtocolError::Unpack("envelope is empty".to_string()));
        }

        let typ = if text.starts_with('{') {
            let value: Value = serde_json::from_str(text)
                .map_err(|e| ProtocolError::Unpack(format!("envelope is not valid JSON: {e}")))?;
            match value.get("typ").and_then(Value::as_str) {
                Some(typ) => typ.to_string(),
                None => return Ok(MediaType::PlainMessage),
            }
        } else {
            let header = text.split('.').next().unwrap_or_default();
            let header: Value = decode_part(header, "header")?;
            header
                .get("typ")
                .and_then(Value::as_str)
                .ok_or_else(|| ProtocolError::Unpack("token header has no typ".to_string()))?
                .to_string()
        };

        MediaType::from_name(&typ).ok_or(ProtocolError::UnsupportedMediaType(typ))
    }

    /// Detect the envelope's media type and unpack it with the matching
    /// packer.
    pub async fn unpack(&self, envelope: &[u8]) -> Result<UnpackedMessage, ProtocolError> {
        let media_type = Self::detect_media_type(envelope)?;
        let packer = self
            .packers
            .get(&media_type)
            .ok_or_else(|| ProtocolError::UnsupportedMediaType(media_type.to_string()))?;
        let message = packer.unpack(envelope).await?;
        Ok(UnpackedMessage {
            message,
            media_type,
        })
    }
}

/// Unsigned JSON messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPacker;

#[async_trait]
impl Packer for PlainPacker {
    fn media_type(&self) -> MediaType {
        MediaType::PlainMessage
    }

    async fn unpack(&self, envelope: &[u8]) -> Result<BasicMessage, ProtocolError> {
        serde_json::from_slice(envelope)
            .map_err(|e| ProtocolError::Unpack(format!("malformed plain message: {e}")))
    }
}

/// Decoded header of a ZK token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZkpHeader {
    pub alg: String,
    #[serde(rename = "circuitId", default)]
    pub circuit_id: String,
    #[serde(default)]
    pub typ: Option<String>,
}

/// A parsed compact ZK token.
#[derive(Debug, Clone, PartialEq)]
pub struct ZkpToken {
    pub header: ZkpHeader,
    /// The inner protocol message.
    pub message: BasicMessage,
    /// Decoded proof section, opaque to the agent.
    pub proof: Value,
    compact: String,
}

impl ZkpToken {
    /// Parse a compact `header.payload.proof` token.
    pub fn parse(token: &str) -> Result<Self, ProtocolError> {
        let token = token.trim();
        let parts: Vec<&str> = token.split('.').collect();
        let [header, payload, proof] = parts.as_slice() else {
            return Err(ProtocolError::Unpack(format!(
                "token must have 3 parts, found {}",
                parts.len()
            )));
        };
        Ok(Self {
            header: decode_part(header, "header")?,
            message: decode_part(payload, "payload")?,
            proof: decode_part(proof, "proof")?,
            compact: token.to_string(),
        })
    }

    /// The token as received.
    pub fn as_compact(&self) -> &str {
        &self.compact
    }
}

fn decode_part<T: serde::de::DeserializeOwned>(part: &str, name: &str) -> Result<T, ProtocolError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|e| ProtocolError::Unpack(format!("token {name} is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ProtocolError::Unpack(format!("token {name} is not valid JSON: {e}")))
}

/// Verifies the proof of a ZK token.
#[async_trait]
pub trait ProofVerifier: Send + Sync {
    /// Verify `token`.
    ///
    /// Returns the DID the proof authenticates, if the verifier reports one.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::ProofRejected`] if the proof is invalid,
    /// [`ProtocolError::VerifierUnavailable`] if verification could not be
    /// performed.
    async fn verify(&self, token: &ZkpToken) -> Result<Option<String>, ProtocolError>;
}

/// ZK token envelopes.
#[derive(Clone)]
pub struct ZkpPacker {
    verifier: Arc<dyn ProofVerifier>,
}

impl ZkpPacker {
    pub fn new(verifier: Arc<dyn ProofVerifier>) -> Self {
        Self { verifier }
    }
}

impl std::fmt::Debug for ZkpPacker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZkpPacker").finish_non_exhaustive()
    }
}

#[async_trait]
impl Packer for ZkpPacker {
    fn media_type(&self) -> MediaType {
        MediaType::ZkpMessage
    }

    async fn unpack(&self, envelope: &[u8]) -> Result<BasicMessage, ProtocolError> {
        let text = std::str::from_utf8(envelope)
            .map_err(|_| ProtocolError::Unpack("token is not valid UTF-8".to_string()))?;
        let token = ZkpToken::parse(text)?;
        if let Some(sender) = self.verifier.verify(&token).await? {
            if token.message.from.as_deref() != Some(sender.as_str()) {
                tracing::warn!(
                    proven_sender = %sender,
                    claimed_sender = ?token.message.from,
                    "ZK proof sender does not match message sender"
                );
                return Err(ProtocolError::ProofRejected(
                    "proof was generated for a different sender".to_string(),
                ));
            }
        }
        Ok(token.message)
    }
}
