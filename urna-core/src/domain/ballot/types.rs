use crate::foundation::{CandidateId, Digest, ElectionId, PositionId, SealHash, VoteHash, VoteTransactionId, VoterId, NO_CANDIDATE_ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteKind {
    Candidate,
    Blank,
    Null,
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VoteKind::Candidate => "candidate",
            VoteKind::Blank => "blank",
            VoteKind::Null => "null",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "candidate_id", rename_all = "snake_case")]
pub enum Choice {
    Candidate(CandidateId),
    Blank,
    Null,
}

impl Choice {
    pub fn kind(&self) -> VoteKind {
        match self {
            Choice::Candidate(_) => VoteKind::Candidate,
            Choice::Blank => VoteKind::Blank,
            Choice::Null => VoteKind::Null,
        }
    }

    pub fn candidate_id(&self) -> Option<CandidateId> {
        match self {
            Choice::Candidate(id) => Some(*id),
            Choice::Blank | Choice::Null => None,
        }
    }

    /// Candidate id as it enters the vote hash; blank and null use the reserved zero id.
    pub fn digest_candidate_id(&self) -> u64 {
        self.candidate_id().map(|id| id.value()).unwrap_or(NO_CANDIDATE_ID)
    }
}

/// One position's choice within a ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub position_id: PositionId,
    pub choice: Choice,
}

impl Selection {
    pub fn candidate(position_id: PositionId, candidate_id: CandidateId) -> Self {
        Self { position_id, choice: Choice::Candidate(candidate_id) }
    }

    pub fn blank(position_id: PositionId) -> Self {
        Self { position_id, choice: Choice::Blank }
    }

    pub fn null(position_id: PositionId) -> Self {
        Self { position_id, choice: Choice::Null }
    }
}

/// Request origin metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub address: Option<String>,
    pub user_agent: Option<String>,
}

impl Origin {
    pub fn new(address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self { address: Some(address.into()), user_agent: Some(user_agent.into()) }
    }
}

/// Plaintext inside a vote's encrypted payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotePayload {
    pub position_id: PositionId,
    pub candidate_id: Option<CandidateId>,
    pub kind: VoteKind,
    pub weight: u32,
}

/// Ledger entry for one position of one ballot. Created once, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureVote {
    pub vote_transaction_id: VoteTransactionId,
    pub election_id: ElectionId,
    pub position_id: PositionId,
    pub voter_id: VoterId,
    pub kind: VoteKind,
    pub encrypted_payload: Vec<u8>,
    pub vote_hash: VoteHash,
    pub vote_signature: Digest,
    pub creation_hash: Digest,
    pub device_fingerprint: Digest,
    pub seal_hash_at_cast: SealHash,
    pub encrypted_justification: Option<Vec<u8>>,
    pub cast_at: DateTime<Utc>,
    pub origin_address: Option<String>,
    pub origin_user_agent: Option<String>,
}
