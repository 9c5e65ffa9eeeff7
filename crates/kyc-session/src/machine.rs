//! # Session Transition Function
//!
//! Given a session and the status the verification provider just reported,
//! decide the status to persist and what happens next. No I/O: issuing the
//! credential is returned as [`Step::Issue`] for the caller to perform.
//!
//! | credential id | reported status        | persisted status | step                |
//! |---------------|------------------------|------------------|---------------------|
//! | set           | any                    | unchanged        | `Complete(id)`      |
//! | unset         | `SUBMISSION_REQUIRED`  | reported         | `Propose`           |
//! | unset         | `PENDING_VERIFICATION` | reported         | `Offer(Pending)`    |
//! | unset         | `REJECTED`             | reported         | `Offer(Rejected)`   |
//! | unset         | `APPROVED`             | reported         | `Issue`             |

use kyc_core::CredentialId;
use kyc_protocol::{OfferStatus, OutboundMessage};

use crate::reply::ReplyFactory;
use crate::session::{Session, Status};

/// What the agent does after a status refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Send a fresh proposal.
    Propose,
    /// Send a pending or rejected offer.
    Offer(OfferStatus),
    /// Send the completed offer for an already issued credential.
    Complete(CredentialId),
    /// Issue a credential, persist its id, then send the completed offer.
    Issue,
}

/// Outcome of [`transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub status: Status,
    pub step: Step,
}

impl Transition {
    /// The reply for this step, or `None` for [`Step::Issue`], whose reply
    /// depends on the issuance result.
    pub fn reply(&self, replies: &ReplyFactory, session: &Session) -> Option<OutboundMessage> {
        match &self.step {
            Step::Propose => Some(replies.proposal(session)),
            Step::Offer(status) => Some(replies.offer(session, *status)),
            Step::Complete(id) => Some(replies.completed(id)),
            Step::Issue => None,
        }
    }
}

/// Decide the next step for `session` given the provider's `reported` status.
pub fn transition(session: &Session, reported: Status) -> Transition {
    if let Some(id) = &session.credential_id {
        return Transition {
            status: session.status,
            step: Step::Complete(id.clone()),
        };
    }
    let step = match reported {
        Status::SubmissionRequired => Step::Propose,
        Status::PendingVerification => Step::Offer(OfferStatus::Pending),
        Status::Rejected => Step::Offer(OfferStatus::Rejected),
        Status::Approved => Step::Issue,
    };
    Transition {
        status: reported,
        step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ClientType;
    use kyc_core::{CredentialDefinition, Did, ExternalSessionId, ThreadId};

    fn session() -> Session {
        Session::new(
            Did::new("did:iden3:holder").unwrap(),
            ExternalSessionId::new("ext-1").unwrap(),
            ThreadId::new("T1").unwrap(),
            ClientType::Web,
        )
    }

    fn replies() -> ReplyFactory {
        ReplyFactory::new(
            "https://agent.example.com",
            "https://issuer.example.com",
            Did::new("did:iden3:issuer").unwrap(),
            CredentialDefinition::proof_of_liveness(),
        )
    }

    #[test]
    fn table_is_total_without_credential() {
        let expected = [
            (Status::SubmissionRequired, Step::Propose),
            (Status::PendingVerification, Step::Offer(OfferStatus::Pending)),
            (Status::Approved, Step::Issue),
            (Status::Rejected, Step::Offer(OfferStatus::Rejected)),
        ];
        for (reported, step) in expected {
            let t = transition(&session(), reported);
            assert_eq!(t.status, reported);
            assert_eq!(t.step, step, "reported {reported}");
        }
    }

    #[test]
    fn every_status_yields_one_reply_shape() {
        let s = session();
        for reported in Status::ALL {
            let t = transition(&s, reported);
            let reply = t.reply(&replies(), &s);
            match (reported, reply) {
                (Status::SubmissionRequired, Some(OutboundMessage::Proposal(_))) => {}
                (Status::PendingVerification, Some(OutboundMessage::CredentialOffer(b)))
                    if b.status() == Some(OfferStatus::Pending) => {}
                (Status::Rejected, Some(OutboundMessage::CredentialOffer(b)))
                    if b.status() == Some(OfferStatus::Rejected) => {}
                (Status::Approved, None) => {}
                (status, reply) => panic!("{status}: unexpected reply {reply:?}"),
            }
        }
    }

    #[test]
    fn issued_credential_short_circuits_every_status() {
        let mut s = session();
        s.status = Status::Approved;
        s.credential_id = Some(CredentialId::new("cred-123").unwrap());
        for reported in Status::ALL {
            let t = transition(&s, reported);
            assert_eq!(t.status, Status::Approved);
            assert_eq!(t.step, Step::Complete(CredentialId::new("cred-123").unwrap()));
        }
    }
}
