//! # Request Metrics
//!
//! In-process counters of handled requests, client errors and server
//! errors, shared through an `Extension`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Shared request counters.
#[derive(Debug, Clone, Default)]
pub struct AgentMetrics {
    requests: Arc<AtomicU64>,
    client_errors: Arc<AtomicU64>,
    server_errors: Arc<AtomicU64>,
}

impl AgentMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn client_errors(&self) -> u64 {
        self.client_errors.load(Ordering::Relaxed)
    }

    pub fn server_errors(&self) -> u64 {
        self.server_errors.load(Ordering::Relaxed)
    }

    fn record(&self, response: &Response) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let status = response.status();
        if status.is_client_error() {
            self.client_errors.fetch_add(1, Ordering::Relaxed);
        } else if status.is_server_error() {
            self.server_errors.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Middleware that counts every response by status class.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<AgentMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.record(&response);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn counts_by_status_class() {
        let metrics = AgentMetrics::new();
        metrics.record(&StatusCode::OK.into_response());
        metrics.record(&StatusCode::NOT_FOUND.into_response());
        metrics.record(&StatusCode::SERVICE_UNAVAILABLE.into_response());
        assert_eq!(metrics.requests(), 3);
        assert_eq!(metrics.client_errors(), 1);
        assert_eq!(metrics.server_errors(), 1);
    }

    #[test]
    fn clones_share_counters() {
        let metrics = AgentMetrics::new();
        let clone = metrics.clone();
        clone.record(&StatusCode::OK.into_response());
        assert_eq!(metrics.requests(), 1);
    }
}
