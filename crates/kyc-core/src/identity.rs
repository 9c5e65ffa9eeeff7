//! # Identifier Newtypes
//!
//! Every identifier the agent handles is a distinct, non-empty string type.
//!
//! - [`Did`]: a holder's (or the issuer's) decentralized identifier. The
//!   agent does not implement DID methods, so only presence is enforced;
//!   resolving and authenticating the DID is the transport packer's job.
//! - [`ThreadId`]: the protocol thread id correlating one conversation.
//! - [`ExternalSessionId`]: the id the verification provider assigned to a
//!   verification session. It is the only key accepted for unauthenticated
//!   polling.
//! - [`CredentialId`]: the id the issuance backend returned for an issued
//!   credential.
//!
//! All four deserialize through [`TryFrom<String>`], so an empty value in an
//! inbound message is rejected by serde rather than slipping through as `""`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create the identifier, rejecting the empty string.
            ///
            /// # Errors
            ///
            /// Returns [`ValidationError::Empty`] if `value` is empty.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                if value.is_empty() {
                    return Err(ValidationError::Empty { kind: $kind });
                }
                Ok(Self(value))
            }

            /// Access the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// A decentralized identifier (`did:<method>:<id>`).
    Did,
    "DID"
);

string_id!(
    /// Protocol thread id, echoed in every reply of a conversation.
    ThreadId,
    "thread id"
);

string_id!(
    /// Verification-session id assigned by the verification provider.
    ExternalSessionId,
    "external session id"
);

string_id!(
    /// Identifier of a credential issued by the issuance backend.
    CredentialId,
    "credential id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn did_accepts_iden3_identifiers() {
        let did = Did::new("did:iden3:privado:main:2Sfns6mQYkPS9gArHEZSXYbpxfWEjvfMsE1LUK4ZLA")
            .unwrap();
        assert!(did.as_str().starts_with("did:iden3:"));
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        assert_eq!(
            Did::new("").unwrap_err(),
            ValidationError::Empty { kind: "DID" }
        );
        assert!(ThreadId::new("").is_err());
        assert!(ExternalSessionId::new("").is_err());
        assert!(CredentialId::new("").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let thid = ThreadId::new("7f38a193-0918-4a48-9fac-36adfdb8b542").unwrap();
        let json = serde_json::to_string(&thid).unwrap();
        assert_eq!(json, "\"7f38a193-0918-4a48-9fac-36adfdb8b542\"");
    }

    #[test]
    fn deserialization_rejects_empty_string() {
        let result: Result<Did, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());

        let did: Did = serde_json::from_str("\"did:web:example.com\"").unwrap();
        assert_eq!(did.to_string(), "did:web:example.com");
    }
}
