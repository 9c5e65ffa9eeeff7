//! # Session Store
//!
//! Thread-safe, cloneable in-memory session table keyed by holder DID, with
//! a secondary index on the external session id so that `/offers` polling
//! is a constant-time lookup.
//!
//! Individual operations take a short `parking_lot` lock and never hold it
//! across `.await`. Multi-step updates of one session (read status, maybe
//! issue, write status and credential id) additionally hold the session's
//! [`SessionGuard`], obtained with [`SessionStore::lock`]. Guards for
//! different DIDs never contend.

use std::collections::HashMap;
use std::sync::Arc;

use kyc_core::{Did, ExternalSessionId};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::session::Session;

/// Exclusive access to one session for the duration of a multi-step update.
pub type SessionGuard = tokio::sync::OwnedMutexGuard<()>;

/// Errors returned by [`SessionStore::create`] and [`SessionStore::update`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("a session already exists for {0}")]
    AlreadyExists(Did),

    #[error("external session id {0} is already in use")]
    DuplicateExternalId(ExternalSessionId),
}

#[derive(Debug, Default)]
struct Tables {
    sessions: HashMap<Did, Session>,
    by_external_id: HashMap<ExternalSessionId, Did>,
}

/// Shared session table.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    tables: Arc<RwLock<Tables>>,
    locks: Arc<Mutex<HashMap<Did, Arc<tokio::sync::Mutex<()>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new session.
    ///
    /// # Errors
    ///
    /// Fails if the DID already has a session or the external session id is
    /// already indexed. The store is left unchanged.
    pub fn create(&self, session: Session) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if tables.sessions.contains_key(&session.id) {
            return Err(StoreError::AlreadyExists(session.id));
        }
        if tables.by_external_id.contains_key(&session.external_session_id) {
            return Err(StoreError::DuplicateExternalId(session.external_session_id));
        }
        tables
            .by_external_id
            .insert(session.external_session_id.clone(), session.id.clone());
        tables.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    /// Session of a holder DID.
    pub fn get(&self, id: &Did) -> Option<Session> {
        self.tables.read().sessions.get(id).cloned()
    }

    /// Replace the stored record for `id`. Does nothing if `id` has no
    /// session. Returns whether a record was replaced.
    ///
    /// # Errors
    ///
    /// Fails with [`StoreError::DuplicateExternalId`] if the new record's
    /// external session id belongs to another session. The store is left
    /// unchanged.
    pub fn update(&self, id: &Did, session: Session) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        let Some(previous) = tables.sessions.get(id) else {
            return Ok(false);
        };
        let previous_external = previous.external_session_id.clone();
        if previous_external != session.external_session_id {
            if tables
                .by_external_id
                .get(&session.external_session_id)
                .is_some_and(|owner| owner != id)
            {
                return Err(StoreError::DuplicateExternalId(session.external_session_id));
            }
            tables.by_external_id.remove(&previous_external);
            tables
                .by_external_id
                .insert(session.external_session_id.clone(), id.clone());
        }
        tables.sessions.insert(id.clone(), session);
        Ok(true)
    }

    /// Remove a session and its index entry.
    pub fn delete(&self, id: &Did) -> Option<Session> {
        let removed = {
            let mut tables = self.tables.write();
            let removed = tables.sessions.remove(id)?;
            tables.by_external_id.remove(&removed.external_session_id);
            removed
        };
        self.release_lock(id);
        Some(removed)
    }

    /// Session owning an external session id.
    pub fn find_by_external_id(&self, external_id: &ExternalSessionId) -> Option<Session> {
        let tables = self.tables.read();
        tables
            .by_external_id
            .get(external_id)
            .and_then(|did| tables.sessions.get(did))
            .cloned()
    }

    /// Remove every completed or rejected session, returning how many were
    /// removed.
    pub fn purge_terminal(&self) -> usize {
        let purged: Vec<Did> = {
            let mut tables = self.tables.write();
            let terminal: Vec<(Did, ExternalSessionId)> = tables
                .sessions
                .values()
                .filter(|s| s.is_terminal())
                .map(|s| (s.id.clone(), s.external_session_id.clone()))
                .collect();
            for (did, external_id) in &terminal {
                tables.sessions.remove(did);
                tables.by_external_id.remove(external_id);
            }
            terminal.into_iter().map(|(did, _)| did).collect()
        };
        for did in &purged {
            self.release_lock(did);
        }
        if !purged.is_empty() {
            tracing::info!(count = purged.len(), "purged terminal sessions");
        }
        purged.len()
    }

    /// Acquire the per-session guard for `id`, waiting for any other holder.
    ///
    /// The DID need not have a session yet: holding the guard across
    /// get-or-create keeps two first requests from the same holder from both
    /// opening a verification session.
    pub async fn lock(&self, id: &Did) -> SessionGuard {
        let mutex = Arc::clone(self.locks.lock().entry(id.clone()).or_default());
        mutex.lock_owned().await
    }

    /// Drop the guard entry for `id` if it has no session and nobody holds
    /// or awaits the guard. Call after dropping a guard taken for a DID
    /// whose session was never created.
    pub fn release_lock(&self, id: &Did) {
        let has_session = self.tables.read().sessions.contains_key(id);
        if has_session {
            return;
        }
        let mut locks = self.locks.lock();
        if locks.get(id).is_some_and(|m| Arc::strong_count(m) == 1) {
            locks.remove(id);
        }
    }

    /// Number of DIDs with a tracked guard entry.
    pub fn guard_count(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn len(&self) -> usize {
        self.tables.read().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
