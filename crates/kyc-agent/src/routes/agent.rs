//! # Agent Endpoint
//!
//! `POST /agent` accepts a packed protocol message as the raw request body
//! (any content type) and answers with the reply envelope, or with a plain
//! text diagnostic for message types the agent does not handle.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::dispatch::AgentReply;
use crate::error::{AppError, ErrorBody};
use crate::extractors::raw_payload;
use crate::state::AppState;

/// Build the agent router.
pub fn router() -> Router<AppState> {
    Router::new().route("/agent", post(handle_message))
}

/// POST /agent: Handle one protocol message.
#[utoipa::path(
    post,
    path = "/agent",
    request_body(content = String, description = "Packed iden3comm message", content_type = "text/plain"),
    responses(
        (status = 200, description = "Reply envelope, or a diagnostic string for unknown message types", body = serde_json::Value),
        (status = 400, description = "Missing payload or invalid message", body = ErrorBody),
        (status = 401, description = "Proof did not authenticate the sender", body = ErrorBody),
        (status = 404, description = "Fetch request names an unknown session", body = ErrorBody),
        (status = 415, description = "Message type not allowed over this transport", body = ErrorBody),
        (status = 502, description = "Upstream rejected the request or issuance failed", body = ErrorBody),
        (status = 503, description = "Upstream service unavailable", body = ErrorBody),
    ),
    tag = "agent"
)]
async fn handle_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let raw = raw_payload(body)?;
    let reply = state.dispatcher.dispatch(&raw).await?;
    Ok(match reply {
        AgentReply::Envelope(envelope) => Json(envelope).into_response(),
        AgentReply::Diagnostic(text) => text.into_response(),
    })
}
