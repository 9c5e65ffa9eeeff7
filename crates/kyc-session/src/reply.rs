//! Reply payloads for a session.

use kyc_core::{CredentialDefinition, CredentialId, Did};
use kyc_protocol::envelope::{PROPOSAL_DESCRIPTION, PROPOSAL_TYPE};
use kyc_protocol::{CredentialInfo, CredentialOfferBody, OfferStatus, OutboundMessage, Proposal, ProposalBody};

use crate::session::Session;

/// Builds proposal and offer payloads.
#[derive(Debug, Clone)]
pub struct ReplyFactory {
    agent_url: String,
    issuer_url: String,
    issuer_did: Did,
    credential: CredentialDefinition,
}

impl ReplyFactory {
    /// Trailing slashes are trimmed from both URLs.
    pub fn new(
        agent_url: impl Into<String>,
        issuer_url: impl Into<String>,
        issuer_did: Did,
        credential: CredentialDefinition,
    ) -> Self {
        Self {
            agent_url: agent_url.into().trim_end_matches('/').to_string(),
            issuer_url: issuer_url.into().trim_end_matches('/').to_string(),
            issuer_did,
            credential,
        }
    }

    /// Verification page for a session.
    pub fn verification_url(&self, session: &Session) -> String {
        format!(
            "{}/index.html?session={}&did={}&clientType={}",
            self.agent_url, session.external_session_id, self.issuer_did, session.client_type
        )
    }

    /// Where holders fetch an issued credential.
    pub fn credential_fetch_url(&self) -> String {
        format!("{}/v1/agent", self.issuer_url)
    }

    /// Invite the holder to (re)submit the verification.
    pub fn proposal(&self, session: &Session) -> OutboundMessage {
        OutboundMessage::Proposal(ProposalBody {
            proposals: vec![Proposal {
                credentials: vec![CredentialInfo {
                    credential_type: self.credential.credential_type.clone(),
                    context: self.credential.context.clone(),
                }],
                proposal_type: PROPOSAL_TYPE.to_string(),
                url: self.verification_url(session),
                description: PROPOSAL_DESCRIPTION.to_string(),
            }],
        })
    }

    /// Report a pending or rejected verification. The holder keeps polling
    /// the agent with the external session id.
    pub fn offer(&self, session: &Session, status: OfferStatus) -> OutboundMessage {
        OutboundMessage::CredentialOffer(CredentialOfferBody::single(
            self.agent_url.clone(),
            session.external_session_id.as_str(),
            self.credential.description.clone(),
            status,
        ))
    }

    /// Present an issued credential.
    pub fn completed(&self, credential_id: &CredentialId) -> OutboundMessage {
        OutboundMessage::CredentialOffer(CredentialOfferBody::single(
            self.credential_fetch_url(),
            credential_id.as_str(),
            self.credential.description.clone(),
            OfferStatus::Completed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ClientType;
    use kyc_core::{ExternalSessionId, ThreadId};

    fn factory() -> ReplyFactory {
        ReplyFactory::new(
            "https://agent.example.com/",
            "https://issuer.example.com",
            Did::new("did:iden3:issuer").unwrap(),
            CredentialDefinition::proof_of_liveness(),
        )
    }

    fn session(client_type: ClientType) -> Session {
        Session::new(
            Did::new("did:iden3:holder").unwrap(),
            ExternalSessionId::new("ext-1").unwrap(),
            ThreadId::new("T1").unwrap(),
            client_type,
        )
    }

    #[test]
    fn proposal_points_at_verification_page() {
        let OutboundMessage::Proposal(body) = factory().proposal(&session(ClientType::Mobile)) else {
            panic!("expected proposal");
        };
        let p = &body.proposals[0];
        assert_eq!(
            p.url,
            "https://agent.example.com/index.html?session=ext-1&did=did:iden3:issuer&clientType=MOBILE"
        );
        assert_eq!(p.proposal_type, "SynapsCredentialProposal");
        assert_eq!(p.credentials[0].credential_type, "AnimaProofOfLife");
    }

    #[test]
    fn pending_offer_references_external_session() {
        let OutboundMessage::CredentialOffer(body) =
            factory().offer(&session(ClientType::Web), OfferStatus::Pending)
        else {
            panic!("expected offer");
        };
        assert_eq!(body.url, "https://agent.example.com");
        assert_eq!(body.credentials[0].id, "ext-1");
        assert_eq!(body.credentials[0].description, "Proof of liveness");
        assert_eq!(body.status(), Some(OfferStatus::Pending));
    }

    #[test]
    fn completed_offer_references_credential() {
        let id = CredentialId::new("cred-123").unwrap();
        let OutboundMessage::CredentialOffer(body) = factory().completed(&id) else {
            panic!("expected offer");
        };
        assert_eq!(body.url, "https://issuer.example.com/v1/agent");
        assert_eq!(body.credentials[0].id, "cred-123");
        assert_eq!(body.status(), Some(OfferStatus::Completed));
    }
}
