//! # Issued Credential Definition
//!
//! The agent issues exactly one credential type. Its JSON-LD context and type
//! must match the single entry of every proposal request, its JSON schema is
//! sent to the issuance backend, and its description is shown to the holder
//! in every credential offer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Issued credentials expire this many days after issuance.
pub const CREDENTIAL_VALIDITY_DAYS: i64 = 30;

/// The credential this agent is configured to issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialDefinition {
    /// JSON-LD context URL, compared against proposal requests.
    pub context: String,
    /// JSON schema URL, sent to the issuance backend.
    pub schema: String,
    /// Credential type, e.g. `AnimaProofOfLife`.
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Human-readable description carried in offers.
    pub description: String,
}

impl CredentialDefinition {
    /// The proof-of-liveness credential issued after a successful
    /// liveness check.
    pub fn proof_of_liveness() -> Self {
        Self {
            context: "https://raw.githubusercontent.com/anima-protocol/claims-polygonid/main/schemas/json-ld/pol-v1.json-ld".to_string(),
            schema: "https://raw.githubusercontent.com/anima-protocol/claims-polygonid/main/schemas/json/PoLAnima-v1.json".to_string(),
            credential_type: "AnimaProofOfLife".to_string(),
            description: "Proof of liveness".to_string(),
        }
    }

    /// Whether a proposal's `(context, type)` pair names this credential.
    pub fn matches(&self, context: &str, credential_type: &str) -> bool {
        self.context == context && self.credential_type == credential_type
    }

    /// Expiration of a credential issued at `issued_at`, in epoch seconds.
    pub fn expiration_after(issued_at: DateTime<Utc>) -> i64 {
        (issued_at + Duration::days(CREDENTIAL_VALIDITY_DAYS)).timestamp()
    }
}

impl Default for CredentialDefinition {
    fn default() -> Self {
        Self::proof_of_liveness()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn matches_requires_both_context_and_type() {
        let def = CredentialDefinition::proof_of_liveness();
        assert!(def.matches(&def.context, &def.credential_type));
        assert!(!def.matches(&def.context, "KYCAgeCredential"));
        assert!(!def.matches("https://example.com/other.json-ld", &def.credential_type));
    }

    #[test]
    fn expiration_is_thirty_days_in_epoch_seconds() {
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let expires = CredentialDefinition::expiration_after(issued);
        assert_eq!(expires - issued.timestamp(), 30 * 24 * 60 * 60);
    }

    #[test]
    fn serializes_type_field_name() {
        let json = serde_json::to_value(CredentialDefinition::default()).unwrap();
        assert_eq!(json["type"], "AnimaProofOfLife");
    }
}
