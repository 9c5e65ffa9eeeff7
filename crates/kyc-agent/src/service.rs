//! # Session Orchestration
//!
//! [`AgentService`] drives a verification session through its lifecycle:
//!
//! - **New session**: the first proposal request from a DID opens a session
//!   with the verification provider and answers with a proposal pointing
//!   the holder at the verification page.
//! - **Resume**: every later proposal request, fetch request or `/offers`
//!   poll refreshes the status from the provider, persists it and answers
//!   according to [`kyc_session::transition`]. An approved session without
//!   a credential gets one issued.
//!
//! Both paths run under the session's [`SessionGuard`](kyc_session::SessionGuard),
//! so concurrent requests for one holder are serialized while other holders
//! proceed in parallel. The guard is the only lock held across upstream
//! calls; the store's own lock never is.
//!
//! `credential_id` is persisted only after the issuance backend confirmed
//! it. Once set, resumes answer with the completed offer without calling
//! either upstream service.

use std::sync::Arc;

use kyc_core::{CredentialDefinition, ExternalSessionId};
use kyc_protocol::{Envelope, EnvelopeBuilder, OutboundMessage, ProposalRequest};
use kyc_providers::{CredentialIssuer, VerificationProvider};
use kyc_session::{transition, ClientType, ReplyFactory, Session, SessionStore, Step};

use crate::error::AgentError;

/// Session lifecycle orchestration.
pub struct AgentService {
    store: SessionStore,
    verification: Arc<dyn VerificationProvider>,
    issuer: Arc<dyn CredentialIssuer>,
    replies: ReplyFactory,
    envelopes: EnvelopeBuilder,
    credential: CredentialDefinition,
}

impl std::fmt::Debug for AgentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentService")
            .field("sessions", &self.store.len())
            .field("agent_did", self.envelopes.sender())
            .finish()
    }
}

impl AgentService {
    pub fn new(
        verification: Arc<dyn VerificationProvider>,
        issuer: Arc<dyn CredentialIssuer>,
        replies: ReplyFactory,
        envelopes: EnvelopeBuilder,
        credential: CredentialDefinition,
    ) -> Self {
        Self {
            store: SessionStore::new(),
            verification,
            issuer,
            replies,
            envelopes,
            credential,
        }
    }

    /// Use an existing (possibly shared) session store.
    pub fn with_store(mut self, store: SessionStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn envelopes(&self) -> &EnvelopeBuilder {
        &self.envelopes
    }

    /// Answer a validated proposal request: open a session for a new holder
    /// or resume the holder's existing one.
    pub async fn handle_proposal_request(
        &self,
        request: ProposalRequest,
    ) -> Result<Envelope, AgentError> {
        let did = request.header.from.clone();
        let guard = self.store.lock(&did).await;
        let result = self.open_or_resume(request).await;
        drop(guard);
        if result.is_err() {
            self.store.release_lock(&did);
        }
        result
    }

    /// The caller holds the guard of the request's sender.
    async fn open_or_resume(&self, request: ProposalRequest) -> Result<Envelope, AgentError> {
        let ProposalRequest { header, body } = request;
        if let Some(session) = self.store.get(&header.from) {
            tracing::debug!(did = %session.did, thid = %header.thid, "proposal request for existing session");
            return self.resume(session).await;
        }

        let external_session_id = self
            .verification
            .create_session(&header.from)
            .await
            .map_err(AgentError::from_provider)?;
        let client_type = ClientType::from_did_doc(body.did_doc.as_ref());
        let session = Session::new(header.from, external_session_id, header.thid, client_type);
        self.store.create(session.clone())?;

        tracing::info!(
            did = %session.did,
            external_session_id = %session.external_session_id,
            thid = %session.thid,
            client_type = %session.client_type,
            "verification session created"
        );
        Ok(self.seal(&session, self.replies.proposal(&session)))
    }

    /// Resume the session owning `external_session_id`. Used by credential
    /// fetch requests and `/offers` polling.
    ///
    /// # Errors
    ///
    /// [`AgentError::SessionNotFound`] if no session has that id. No session
    /// is created.
    pub async fn credential_offer_exchange(
        &self,
        external_session_id: &ExternalSessionId,
    ) -> Result<Envelope, AgentError> {
        let not_found = || AgentError::SessionNotFound(external_session_id.to_string());
        let found = self
            .store
            .find_by_external_id(external_session_id)
            .ok_or_else(not_found)?;

        let guard = self.store.lock(&found.id).await;
        // Re-read under the guard: a concurrent request may have moved it on.
        let Some(session) = self
            .store
            .get(&found.id)
            .filter(|s| &s.external_session_id == external_session_id)
        else {
            drop(guard);
            self.store.release_lock(&found.id);
            return Err(not_found());
        };
        self.resume(session).await
    }

    /// Refresh, persist and answer. The caller holds the session's guard.
    async fn resume(&self, mut session: Session) -> Result<Envelope, AgentError> {
        let next = match &session.credential_id {
            Some(_) => transition(&session, session.status),
            None => {
                let reported = self
                    .verification
                    .session_status(&session.external_session_id)
                    .await
                    .map_err(AgentError::from_provider)?;
                transition(&session, reported)
            }
        };

        if session.status != next.status {
            tracing::info!(
                did = %session.did,
                external_session_id = %session.external_session_id,
                from = %session.status,
                status = %next.status,
                "session status changed"
            );
            session.record_status(next.status);
            self.store.update(&session.id, session.clone())?;
        }

        let body = match next.reply(&self.replies, &session) {
            Some(body) => body,
            None => {
                debug_assert_eq!(next.step, Step::Issue);
                self.issue(&mut session).await?
            }
        };
        Ok(self.seal(&session, body))
    }

    /// Issue the credential of an approved session and persist its id.
    async fn issue(&self, session: &mut Session) -> Result<OutboundMessage, AgentError> {
        let credential_id = self
            .issuer
            .issue(&session.did, &self.credential)
            .await
            .map_err(|e| {
                tracing::warn!(did = %session.did, error = %e, "credential issuance failed");
                AgentError::from_provider(e)
            })?;

        session.record_credential(credential_id.clone());
        self.store.update(&session.id, session.clone())?;
        tracing::info!(
            did = %session.did,
            external_session_id = %session.external_session_id,
            credential_id = %credential_id,
            "credential issued"
        );
        Ok(self.replies.completed(&credential_id))
    }

    fn seal(&self, session: &Session, body: OutboundMessage) -> Envelope {
        self.envelopes
            .seal(session.did.clone(), session.thid.clone(), body)
    }
}
