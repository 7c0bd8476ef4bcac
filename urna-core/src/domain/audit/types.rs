use crate::foundation::{now_nanos, AdminId, ElectionId, VoterId};
use serde::{Deserialize, Serialize};

/// Structured detail of an audited action. Never carries a voter's choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    ElectionSealed {
        seal_hash: String,
        position_count: usize,
        revision: u64,
    },
    SealValidated {
        valid: bool,
        stored_hash: Option<String>,
        computed_hash: String,
    },
    StatusChanged {
        from: String,
        to: String,
    },
    BallotEditRejected {
        field: String,
        reason: String,
    },
    VoteCast {
        vote_transaction_id: String,
        position_count: usize,
    },
    VoteRejected {
        error_code: String,
        reason: String,
    },
    ReceiptIssued {
        vote_transaction_id: String,
        receipt_hash: String,
    },
    ZeroReportGenerated {
        report_id: String,
        content_hash: String,
    },
    CountingReportGenerated {
        report_id: String,
        content_hash: String,
        total_ballots: u64,
        skipped_votes: u64,
    },
    IntegrityVerified {
        integrity_valid: bool,
        stored_hash: Option<String>,
        computed_hash: String,
        votes_with_foreign_seal: u64,
        votes_with_invalid_signature: u64,
    },
}

impl AuditEvent {
    pub fn action(&self) -> &'static str {
        match self {
            AuditEvent::ElectionSealed { .. } => "election.seal",
            AuditEvent::SealValidated { .. } => "election.validate_seal",
            AuditEvent::StatusChanged { .. } => "election.status",
            AuditEvent::BallotEditRejected { .. } => "election.edit_rejected",
            AuditEvent::VoteCast { .. } => "vote.cast",
            AuditEvent::VoteRejected { .. } => "vote.rejected",
            AuditEvent::ReceiptIssued { .. } => "receipt.issue",
            AuditEvent::ZeroReportGenerated { .. } => "report.zero",
            AuditEvent::CountingReportGenerated { .. } => "report.counting",
            AuditEvent::IntegrityVerified { .. } => "election.verify_integrity",
        }
    }
}

/// Who performed an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Admin(AdminId),
    Voter(VoterId),
    System,
}

impl Actor {
    pub fn id(&self) -> String {
        match self {
            Actor::Admin(id) => format!("admin:{}", id),
            Actor::Voter(id) => format!("voter:{}", id),
            Actor::System => "system".to_string(),
        }
    }
}

/// One audit record: `record(actor_id, action, resource_type, resource_id, detail)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor_id: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: AuditEvent,
    pub timestamp_ns: u64,
}

impl AuditEntry {
    pub fn new(actor: Actor, resource_type: &str, resource_id: impl ToString, detail: AuditEvent) -> Self {
        Self {
            actor_id: actor.id(),
            action: detail.action().to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            detail,
            timestamp_ns: now_nanos(),
        }
    }

    pub fn election(actor: Actor, election_id: ElectionId, detail: AuditEvent) -> Self {
        Self::new(actor, "election", election_id, detail)
    }
}
