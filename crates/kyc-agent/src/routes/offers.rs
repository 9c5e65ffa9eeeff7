//! # Offer Polling
//!
//! `GET /offers?sessionID=` resumes a session by its external session id, so
//! a verification page or wallet can poll without sending a protocol
//! message.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use kyc_core::ExternalSessionId;
use kyc_protocol::Envelope;
use serde::Deserialize;

use crate::error::{AppError, ErrorBody};
use crate::extractors::{extract_query, required_param};
use crate::state::AppState;

/// Query string of `GET /offers`.
#[derive(Debug, Deserialize)]
pub struct OffersQuery {
    #[serde(rename = "sessionID")]
    pub session_id: Option<String>,
}

/// Build the offers router.
pub fn router() -> Router<AppState> {
    Router::new().route("/offers", get(get_offer))
}

/// GET /offers: Current offer for a verification session.
#[utoipa::path(
    get,
    path = "/offers",
    params(("sessionID" = String, Query, description = "External session id assigned by the verification provider")),
    responses(
        (status = 200, description = "Reply envelope for the session's current status", body = serde_json::Value),
        (status = 400, description = "Missing sessionID", body = ErrorBody),
        (status = 404, description = "Unknown session", body = ErrorBody),
        (status = 502, description = "Upstream rejected the request or issuance failed", body = ErrorBody),
        (status = 503, description = "Upstream service unavailable", body = ErrorBody),
    ),
    tag = "agent"
)]
async fn get_offer(
    State(state): State<AppState>,
    query: Result<Query<OffersQuery>, QueryRejection>,
) -> Result<Json<Envelope>, AppError> {
    let query = extract_query(query)?;
    let raw = required_param(query.session_id, "sessionID")?;
    let session_id = ExternalSessionId::new(raw)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let envelope = state
        .service()
        .credential_offer_exchange(&session_id)
        .await?;
    Ok(Json(envelope))
}
