//! # Validation Errors
//!
//! Structured errors for identifier construction, built with `thiserror`.

use thiserror::Error;

/// Validation errors for identifier newtypes.
///
/// Each identifier enforces its constraints at construction time, including
/// when it is deserialized from an inbound protocol message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An identifier that must be present was empty.
    #[error("{kind} must not be empty")]
    Empty {
        /// Which identifier was empty (e.g. "DID", "thread id").
        kind: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_display_names_the_identifier() {
        let err = ValidationError::Empty { kind: "DID" };
        assert_eq!(err.to_string(), "DID must not be empty");
    }
}
