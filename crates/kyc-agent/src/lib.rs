//! # kyc-agent: iden3comm Credential-Issuance Agent
//!
//! Receives protocol messages from a holder's wallet, tracks the holder's
//! liveness verification with the verification provider and issues a
//! proof-of-liveness credential once the provider approves.
//!
//! ## API Surface
//!
//! | Route                    | Module                 | Purpose                          |
//! |--------------------------|------------------------|----------------------------------|
//! | `POST /agent`            | [`routes::agent`]      | Packed protocol messages         |
//! | `GET /offers?sessionID=` | [`routes::offers`]     | Poll a session without a message |
//! | `GET /openapi.json`      | [`openapi`]            | OpenAPI document                 |
//! | `GET /health/*`          | this module            | Liveness and readiness probes    |
//!
//! ## Request Flow
//!
//! ```text
//! POST /agent ─► Dispatcher ─► unpack ─► validate ─┬─► discovery handler
//!                                                  ├─► AgentService (open / resume session)
//!                                                  └─► diagnostic text
//! GET /offers ─────────────────────────────────────────► AgentService (resume session)
//! ```
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CorsLayer → TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod dispatch;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod service;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::middleware::metrics::AgentMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    app_with_metrics(state, AgentMetrics::new())
}

/// [`app`] recording into caller-provided counters.
pub fn app_with_metrics(state: AppState, metrics: AgentMetrics) -> Router {
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new()
        .merge(health)
        .merge(routes::agent::router())
        .merge(routes::offers::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(CorsLayer::permissive())
        .layer(axum::Extension(metrics))
        .with_state(state)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
