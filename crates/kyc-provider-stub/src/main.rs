//! Verification provider and issuance backend stub: standalone development
//! server.
//!
//! Serves the endpoints `kyc-providers` calls so the agent can run end to
//! end without a Synaps account or an issuer node. Point both
//! `SYNAPS_API_URL` and `ISSUER_API_AGENT_URL` at it; sessions are moved
//! between statuses with `POST /v4/individual/session/{id}/status`.
//!
//! Storage is in-memory (DashMap) with no persistence: data is lost on
//! restart.

mod routes;
mod store;

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("PROVIDER_STUB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9100);

    let state = store::StubState::new();
    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("kyc-provider-stub listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
