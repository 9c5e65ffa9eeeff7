//! # Request Extraction Helpers
//!
//! Map axum extractor rejections and unusable inputs to
//! [`AppError::BadRequest`] so every client error shares the JSON error body.

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::Query;

use crate::error::AppError;

/// Extract query parameters, mapping deserialization errors to
/// [`AppError::BadRequest`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// The raw packed message of `POST /agent`. Any content type is accepted;
/// only an empty body is refused.
pub fn raw_payload(body: Bytes) -> Result<Bytes, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest("raw payload is missing".to_string()));
    }
    Ok(body)
}

/// A required, non-empty query parameter.
pub fn required_param(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!(
            "query parameter {name} is required"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(
            raw_payload(Bytes::new()),
            Err(AppError::BadRequest(m)) if m == "raw payload is missing"
        ));
        assert!(raw_payload(Bytes::from_static(b" \n")).is_err());
        assert!(raw_payload(Bytes::from_static(b"{}")).is_ok());
    }

    #[test]
    fn required_param_rejects_missing_and_blank() {
        assert!(required_param(None, "sessionID").is_err());
        assert!(required_param(Some("  ".into()), "sessionID").is_err());
        assert_eq!(required_param(Some("ext-1".into()), "sessionID").unwrap(), "ext-1");
    }
}
