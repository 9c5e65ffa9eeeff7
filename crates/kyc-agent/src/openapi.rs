//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// OpenAPI document of the agent's HTTP surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "KYC Credential Agent",
        version = "0.1.0",
        description = "iden3comm agent issuing a proof-of-liveness credential once the verification provider approves the holder's session."
    ),
    paths(
        crate::routes::agent::handle_message,
        crate::routes::offers::get_offer,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "agent", description = "Protocol messages and session polling"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
