//! Route definitions for the provider stub.
//!
//! Implements the endpoints `kyc-providers` calls, with responses that
//! deserialize into the clients' wire types, plus a status hook for driving
//! a session through its lifecycle by hand:
//!
//! ```text
//! curl -X POST localhost:9100/v4/individual/session/<id>/status \
//!      -H 'content-type: application/json' -d '{"status":"APPROVED"}'
//! ```

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use kyc_session::Status;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::store::{StubSession, StubState};

/// Build the complete router with all stub routes.
pub fn router(state: StubState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Verification provider
        .route("/v4/session/init", post(session_init))
        .route("/v4/individual/session/{id}", get(session_get))
        .route("/v4/individual/session/{id}/status", post(session_set_status))
        // Issuance backend
        .route("/v2/identities/{did}/credentials", post(credential_create))
        .route("/v2/identities/{did}/credentials/{id}", get(credential_get))
        .fallback(not_implemented)
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────

async fn health() -> StatusCode {
    StatusCode::OK
}

// ── Verification provider ───────────────────────────────────────────

fn has_api_key(headers: &HeaderMap) -> bool {
    headers
        .get("Api-Key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
struct InitSession {
    #[serde(rename = "Alias", default)]
    alias: String,
}

async fn session_init(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<InitSession>,
) -> Response {
    if !has_api_key(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let id = Uuid::new_v4().to_string();
    state.sessions().insert(
        id.clone(),
        StubSession {
            alias: body.alias.clone(),
            status: Status::SubmissionRequired,
        },
    );
    tracing::info!(session_id = %id, alias = %body.alias, "verification session opened");
    Json(json!({ "session_id": id, "sandbox": true })).into_response()
}

async fn session_get(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !has_api_key(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.sessions().get(&id) {
        Some(entry) => Json(json!({
            "session": {
                "id": id,
                "alias": entry.alias,
                "status": entry.status.as_str(),
            }
        }))
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct SetStatus {
    status: String,
}

async fn session_set_status(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Json(body): Json<SetStatus>,
) -> Response {
    let Some(status) = Status::from_name(&body.status) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("unknown status {}", body.status) })),
        )
            .into_response();
    };
    match state.sessions().get_mut(&id) {
        Some(mut entry) => {
            entry.status = status;
            tracing::info!(session_id = %id, %status, "verification status set");
            Json(json!({ "id": id, "status": status.as_str() })).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ── Issuance backend ────────────────────────────────────────────────

fn has_basic_auth(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "))
}

async fn credential_create(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(did): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !has_basic_auth(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let subject = body
        .pointer("/credentialSubject/id")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if subject.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "credentialSubject.id is required" })),
        )
            .into_response();
    }

    let id = Uuid::new_v4();
    let credential = json!({
        "id": id.to_string(),
        "issuer": did,
        "type": body.get("type"),
        "credentialSchema": body.get("credentialSchema"),
        "credentialSubject": body.get("credentialSubject"),
        "expiration": body.get("expiration"),
        "createdAt": Utc::now().to_rfc3339(),
    });
    state.credentials().insert(id, credential);
    tracing::info!(credential_id = %id, subject, "credential issued");
    (StatusCode::CREATED, Json(json!({ "id": id.to_string() }))).into_response()
}

async fn credential_get(
    State(state): State<StubState>,
    Path((_did, id)): Path<(String, Uuid)>,
) -> Response {
    match state.credentials().get(&id) {
        Some(entry) => Json(entry.value().clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ── Fallback ────────────────────────────────────────────────────────

async fn not_implemented() -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}
