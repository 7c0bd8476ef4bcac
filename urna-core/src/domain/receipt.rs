use crate::domain::ballot::ResolvedSelection;
use crate::domain::crypto::receipt_hash;
use crate::domain::election::{Election, Voter};
use crate::foundation::util::masking::mask_national_id;
use crate::foundation::{CandidateId, Digest, ElectionId, PositionId, ReceiptToken, UrnaError, VoteHash, VoteTransactionId, VoterId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-position line of a receipt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDetail {
    pub position_id: PositionId,
    pub position_title: String,
    pub candidate_id: Option<CandidateId>,
    pub candidate_name: Option<String>,
    pub candidate_number: Option<u32>,
    pub is_blank: bool,
    pub is_null: bool,
}

impl From<&ResolvedSelection> for VoteDetail {
    fn from(selection: &ResolvedSelection) -> Self {
        let kind = selection.choice.kind();
        Self {
            position_id: selection.position.id,
            position_title: selection.position.title.clone(),
            candidate_id: selection.candidate.as_ref().map(|c| c.id),
            candidate_name: selection.candidate.as_ref().map(|c| c.name.clone()),
            candidate_number: selection.candidate.as_ref().map(|c| c.number),
            is_blank: kind == crate::domain::ballot::VoteKind::Blank,
            is_null: kind == crate::domain::ballot::VoteKind::Null,
        }
    }
}

/// Voter-facing receipt body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub token: ReceiptToken,
    pub vote_transaction_id: VoteTransactionId,
    pub receipt_hash: Digest,
    pub election_id: ElectionId,
    pub election_title: String,
    pub voter_name: String,
    pub masked_national_id: String,
    pub cast_at: DateTime<Utc>,
    pub details: Vec<VoteDetail>,
}

impl Receipt {
    pub fn build(
        token: ReceiptToken,
        tx_id: &VoteTransactionId,
        voter: &Voter,
        election: &Election,
        selections: &[ResolvedSelection],
        cast_at: DateTime<Utc>,
    ) -> Self {
        Self {
            receipt_hash: receipt_hash(tx_id, &token, &cast_at),
            token,
            vote_transaction_id: tx_id.clone(),
            election_id: election.id,
            election_title: election.title.clone(),
            voter_name: voter.name.clone(),
            masked_national_id: mask_national_id(&voter.national_id),
            cast_at,
            details: selections.iter().map(VoteDetail::from).collect(),
        }
    }
}

/// Persisted receipt row, written in the same commit as its votes. Immutable once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub token: ReceiptToken,
    /// Vote hash of each committed row, in ballot order.
    pub vote_hashes: Vec<VoteHash>,
    pub voter_id: VoterId,
    pub election_id: ElectionId,
    pub issued_at: DateTime<Utc>,
    /// Serialized [`Receipt`] (JSON).
    pub body: String,
}

impl VoteReceipt {
    pub fn from_receipt(receipt: &Receipt, vote_hashes: Vec<VoteHash>, voter_id: VoterId, issued_at: DateTime<Utc>) -> Result<Self, UrnaError> {
        Ok(Self {
            token: receipt.token.clone(),
            vote_hashes,
            voter_id,
            election_id: receipt.election_id,
            issued_at,
            body: serde_json::to_string(receipt)?,
        })
    }

    pub fn receipt(&self) -> Result<Receipt, UrnaError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
