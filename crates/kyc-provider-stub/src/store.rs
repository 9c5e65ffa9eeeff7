//! In-memory storage backend using DashMap.
//!
//! Verification sessions are keyed by the session id handed to the agent;
//! issued credentials by their uuid.

use std::sync::Arc;

use dashmap::DashMap;
use kyc_session::Status;
use serde_json::Value;
use uuid::Uuid;

/// A verification session as the stub provider tracks it.
#[derive(Debug, Clone)]
pub struct StubSession {
    /// The holder DID the agent opened the session for.
    pub alias: String,
    pub status: Status,
}

struct Inner {
    sessions: DashMap<String, StubSession>,
    credentials: DashMap<Uuid, Value>,
}

/// Shared stub state. Cheaply cloneable via `Arc`; all clones share data.
#[derive(Clone)]
pub struct StubState {
    inner: Arc<Inner>,
}

impl StubState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                sessions: DashMap::new(),
                credentials: DashMap::new(),
            }),
        }
    }

    pub fn sessions(&self) -> &DashMap<String, StubSession> {
        &self.inner.sessions
    }

    pub fn credentials(&self) -> &DashMap<Uuid, Value> {
        &self.inner.credentials
    }
}
