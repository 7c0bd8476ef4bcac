use crate::domain::election::{Administrator, BallotDefinition, BallotEdit, Candidate, Election, ElectionStatus, Position, SealRecord, Voter};
use crate::domain::{ReportSnapshot, SecureVote, VoteReceipt};
use crate::foundation::{AdminId, CandidateId, ElectionId, PositionId, ReceiptToken, UrnaError, VoteTransactionId, VoterId};
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, UrnaError>;

/// Transactional store behind the election core.
///
/// Reference-data upserts are plain writes with no business rules. The guarded
/// operations (`apply_ballot_edit`, `compare_and_set_status`, `record_seal`, ballot
/// commit, zero-report insert) are linearizable per election. Ballot commit and the
/// zero-report insert serialize against each other.
pub trait ElectionStore: Send + Sync {
    fn upsert_election(&self, election: &Election) -> Result<()>;
    fn get_election(&self, election_id: ElectionId) -> Result<Option<Election>>;
    fn list_elections(&self) -> Result<Vec<Election>>;

    fn upsert_position(&self, position: &Position) -> Result<()>;
    fn get_position(&self, position_id: PositionId) -> Result<Option<Position>>;
    fn list_positions(&self, election_id: ElectionId) -> Result<Vec<Position>>;

    fn upsert_candidate(&self, candidate: &Candidate) -> Result<()>;
    fn get_candidate(&self, candidate_id: CandidateId) -> Result<Option<Candidate>>;
    fn list_candidates(&self, position_id: PositionId) -> Result<Vec<Candidate>>;

    fn upsert_voter(&self, voter: &Voter) -> Result<()>;
    fn get_voter(&self, voter_id: VoterId) -> Result<Option<Voter>>;

    fn upsert_administrator(&self, admin: &Administrator) -> Result<()>;
    fn get_administrator(&self, admin_id: AdminId) -> Result<Option<Administrator>>;

    /// Election plus every position and candidate under it.
    fn load_ballot(&self, election_id: ElectionId) -> Result<Option<BallotDefinition>> {
        let Some(election) = self.get_election(election_id)? else {
            return Ok(None);
        };
        let positions = self.list_positions(election_id)?;
        let mut candidates = Vec::new();
        for position in &positions {
            candidates.extend(self.list_candidates(position.id)?);
        }
        Ok(Some(BallotDefinition { election, positions, candidates }))
    }

    /// Applies a ballot edit while the election is unsealed; bumps `revision`.
    fn apply_ballot_edit(&self, election_id: ElectionId, edit: &BallotEdit, now: DateTime<Utc>) -> Result<Election>;

    /// Writes `next` only if the stored status is still `expected`.
    fn compare_and_set_status(&self, election_id: ElectionId, expected: ElectionStatus, next: ElectionStatus, now: DateTime<Utc>)
        -> Result<Election>;

    /// Atomically checks the election is unsealed, active and at `record.revision`, then writes the
    /// seal fields, status `sealed` and the archived record.
    fn record_seal(&self, record: &SealRecord) -> Result<Election>;
    fn get_seal_record(&self, election_id: ElectionId) -> Result<Option<SealRecord>>;

    fn begin_ballot(&self, election_id: ElectionId, voter_id: VoterId) -> Result<Box<dyn BallotTransaction + '_>>;
    fn has_voted(&self, voter_id: VoterId, election_id: ElectionId) -> Result<bool>;
    fn list_votes(&self, election_id: ElectionId) -> Result<Vec<SecureVote>>;
    fn votes_for_transaction(&self, tx_id: &VoteTransactionId) -> Result<Vec<SecureVote>>;

    fn get_receipt(&self, token: &ReceiptToken) -> Result<Option<VoteReceipt>>;

    /// Zero reports are unique per election (`ReportAlreadyExists`) and only accepted while the
    /// election has no committed ballot (`VotesAlreadyCast`).
    fn insert_report(&self, report: &ReportSnapshot) -> Result<()>;
    fn get_zero_report(&self, election_id: ElectionId) -> Result<Option<ReportSnapshot>>;
    fn list_reports(&self, election_id: ElectionId) -> Result<Vec<ReportSnapshot>>;

    fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// All-or-nothing write set for one ballot.
///
/// `commit` claims the `(voter, election)` key and writes every staged row, plus the
/// attached receipt, in one atomic step. It fails with `AlreadyVoted` if the key is
/// taken and with `StorageError` on a receipt token collision; either way nothing is
/// written. Dropping without commit is a rollback.
pub trait BallotTransaction: Send {
    fn stage_vote(&mut self, vote: SecureVote) -> Result<()>;
    /// Replaces any previously attached receipt.
    fn attach_receipt(&mut self, receipt: VoteReceipt) -> Result<()>;
    fn staged(&self) -> usize;
    fn commit(self: Box<Self>) -> Result<usize>;
    fn rollback(self: Box<Self>);
}

pub(crate) fn ensure_receipt_matches(election_id: ElectionId, voter_id: VoterId, receipt: &VoteReceipt) -> Result<()> {
    if receipt.election_id != election_id || receipt.voter_id != voter_id {
        return Err(UrnaError::StorageError {
            operation: "attach_receipt".to_string(),
            details: format!(
                "receipt for election={} voter={} attached to ballot for election={} voter={}",
                receipt.election_id, receipt.voter_id, election_id, voter_id
            ),
        });
    }
    Ok(())
}

pub(crate) fn duplicate_receipt_token() -> UrnaError {
    UrnaError::StorageError { operation: "ballot commit".to_string(), details: "duplicate receipt token".to_string() }
}

pub(crate) fn ensure_stageable(election_id: ElectionId, voter_id: VoterId, vote: &SecureVote) -> Result<()> {
    if vote.election_id != election_id || vote.voter_id != voter_id {
        return Err(UrnaError::StorageError {
            operation: "stage_vote".to_string(),
            details: format!(
                "vote for election={} voter={} staged in ballot for election={} voter={}",
                vote.election_id, vote.voter_id, election_id, voter_id
            ),
        });
    }
    Ok(())
}

/// Seal test-and-set shared by every backend; callers hold the election's write lock.
pub(crate) fn apply_seal(mut election: Election, record: &SealRecord) -> Result<Election> {
    if election.is_sealed {
        return Err(UrnaError::ElectionAlreadySealed { election_id: election.id.value() });
    }
    if election.revision != record.revision {
        return Err(UrnaError::ConcurrentModification {
            election_id: election.id.value(),
            expected: record.revision,
            actual: election.revision,
        });
    }
    if election.status != ElectionStatus::Active {
        return Err(UrnaError::InvalidStateTransition { from: election.status.to_string(), to: ElectionStatus::Sealed.to_string() });
    }
    election.is_sealed = true;
    election.seal_hash = Some(record.seal_hash);
    election.sealed_at = Some(record.sealed_at);
    election.sealed_by = Some(record.sealed_by);
    election.status = ElectionStatus::Sealed;
    election.updated_at = record.sealed_at;
    Ok(election)
}

/// Reference-data writes may change anything except a seal once set.
pub(crate) fn ensure_seal_preserved(stored: Option<&Election>, incoming: &Election) -> Result<()> {
    let Some(stored) = stored else {
        return Ok(());
    };
    let seal_kept = !stored.is_sealed || (incoming.is_sealed && incoming.seal_hash == stored.seal_hash);
    if !seal_kept {
        return Err(UrnaError::ElectionImmutable { election_id: stored.id.value(), field: "seal".to_string() });
    }
    Ok(())
}
