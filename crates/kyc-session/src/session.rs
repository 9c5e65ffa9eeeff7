//! Session record.

use chrono::{DateTime, Utc};
use kyc_core::{CredentialId, Did, ExternalSessionId, ThreadId};
use kyc_protocol::DidDocument;
use serde::{Deserialize, Serialize};

/// Verification status as reported by the verification provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// The holder has not submitted the verification yet.
    SubmissionRequired,
    /// Submitted, awaiting the provider's decision.
    PendingVerification,
    /// Verification passed; a credential may be issued.
    Approved,
    /// Verification failed.
    Rejected,
}

impl Status {
    /// Every status, in lifecycle order.
    pub const ALL: [Status; 4] = [
        Self::SubmissionRequired,
        Self::PendingVerification,
        Self::Approved,
        Self::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubmissionRequired => "SUBMISSION_REQUIRED",
            Self::PendingVerification => "PENDING_VERIFICATION",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parse a provider status string.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The wallet surface a holder uses, which decides how the verification
/// page hands control back to the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClientType {
    Mobile,
    Web,
}

impl ClientType {
    /// DID document service type of mobile wallets.
    pub const MOBILE_SERVICE_TYPE: &'static str = "Iden3MobileServiceV1";
    /// DID document service type of browser wallets.
    pub const WEB_REDIRECT_SERVICE_TYPE: &'static str = "Iden3WebRedirectV1";

    /// Classify a holder from the DID document attached to its proposal
    /// request. A mobile service wins; anything else is treated as web.
    pub fn from_did_doc(did_doc: Option<&DidDocument>) -> Self {
        let services = did_doc.and_then(|doc| doc.service.as_deref()).unwrap_or_default();
        if services.iter().any(|s| s.is_type(Self::MOBILE_SERVICE_TYPE)) {
            Self::Mobile
        } else {
            Self::Web
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "MOBILE",
            Self::Web => "WEB",
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A holder's verification session.
///
/// Keyed by the holder DID; `id` and `did` are always equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Did,
    pub did: Did,
    pub external_session_id: ExternalSessionId,
    /// Thread of the proposal request that opened the session.
    pub thid: ThreadId,
    pub status: Status,
    /// Set once, after the issuance backend confirmed the credential.
    pub credential_id: Option<CredentialId>,
    pub client_type: ClientType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// A freshly opened session awaiting submission.
    pub fn new(
        did: Did,
        external_session_id: ExternalSessionId,
        thid: ThreadId,
        client_type: ClientType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: did.clone(),
            did,
            external_session_id,
            thid,
            status: Status::SubmissionRequired,
            credential_id: None,
            client_type,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mirror a status reported by the verification provider.
    pub fn record_status(&mut self, status: Status) {
        if self.status != status {
            self.status = status;
            self.updated_at = Utc::now();
        }
    }

    /// Mark the session completed. Has no effect once a credential id is
    /// set.
    pub fn record_credential(&mut self, credential_id: CredentialId) {
        if self.credential_id.is_none() {
            self.credential_id = Some(credential_id);
            self.updated_at = Utc::now();
        }
    }

    /// Whether a credential has been issued for this session.
    pub fn is_completed(&self) -> bool {
        self.credential_id.is_some()
    }

    /// Completed or rejected; no further progress is expected.
    pub fn is_terminal(&self) -> bool {
        self.is_completed() || self.status == Status::Rejected
    }
}
