use crate::domain::election::{Administrator, BallotEdit, Candidate, Election, ElectionStatus, Position, SealRecord, Voter};
use crate::domain::{BallotDefinition, ReportKind, ReportSnapshot, SecureVote, VoteReceipt};
use crate::foundation::{AdminId, CandidateId, ElectionId, PositionId, ReceiptToken, UrnaError, VoteTransactionId, VoterId};
use crate::infrastructure::storage::traits::{apply_seal, duplicate_receipt_token, ensure_receipt_matches, ensure_seal_preserved, ensure_stageable};
use crate::infrastructure::storage::{BallotTransaction, ElectionStore, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct MemoryInner {
    election: BTreeMap<ElectionId, Election>,
    position: BTreeMap<PositionId, Position>,
    candidate: BTreeMap<CandidateId, Candidate>,
    voter: HashMap<VoterId, Voter>,
    admin: HashMap<AdminId, Administrator>,
    seal: HashMap<ElectionId, SealRecord>,
    votes: Vec<SecureVote>,
    ballot_key: HashMap<(ElectionId, VoterId), VoteTransactionId>,
    receipt: HashMap<ReceiptToken, VoteReceipt>,
    reports: Vec<ReportSnapshot>,
}

/// Single-mutex store; every operation is trivially linearizable.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|_| UrnaError::StorageError { operation: "memory storage lock".to_string(), details: "poisoned".to_string() })
    }

    /// Test hook: overwrite a committed vote row in place, bypassing the ledger's append-only rule.
    pub fn tamper_vote(&self, tx_id: &VoteTransactionId, position_id: PositionId, mutate: impl FnOnce(&mut SecureVote)) -> Result<bool> {
        let mut inner = self.lock_inner()?;
        match inner.votes.iter_mut().find(|v| &v.vote_transaction_id == tx_id && v.position_id == position_id) {
            Some(vote) => {
                mutate(vote);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl MemoryInner {
    fn definition(&self, election_id: ElectionId) -> Option<BallotDefinition> {
        let election = self.election.get(&election_id)?.clone();
        let positions: Vec<Position> = self.position.values().filter(|p| p.election_id == election_id).cloned().collect();
        let candidates = self.candidate.values().filter(|c| positions.iter().any(|p| p.id == c.position_id)).cloned().collect();
        Some(BallotDefinition { election, positions, candidates })
    }
}

impl ElectionStore for MemoryStorage {
    fn upsert_election(&self, election: &Election) -> Result<()> {
        let mut inner = self.lock_inner()?;
        ensure_seal_preserved(inner.election.get(&election.id), election)?;
        inner.election.insert(election.id, election.clone());
        Ok(())
    }

    fn get_election(&self, election_id: ElectionId) -> Result<Option<Election>> {
        Ok(self.lock_inner()?.election.get(&election_id).cloned())
    }

    fn list_elections(&self) -> Result<Vec<Election>> {
        Ok(self.lock_inner()?.election.values().cloned().collect())
    }

    fn upsert_position(&self, position: &Position) -> Result<()> {
        self.lock_inner()?.position.insert(position.id, position.clone());
        Ok(())
    }

    fn get_position(&self, position_id: PositionId) -> Result<Option<Position>> {
        Ok(self.lock_inner()?.position.get(&position_id).cloned())
    }

    fn list_positions(&self, election_id: ElectionId) -> Result<Vec<Position>> {
        Ok(self.lock_inner()?.position.values().filter(|p| p.election_id == election_id).cloned().collect())
    }

    fn upsert_candidate(&self, candidate: &Candidate) -> Result<()> {
        self.lock_inner()?.candidate.insert(candidate.id, candidate.clone());
        Ok(())
    }

    fn get_candidate(&self, candidate_id: CandidateId) -> Result<Option<Candidate>> {
        Ok(self.lock_inner()?.candidate.get(&candidate_id).cloned())
    }

    fn list_candidates(&self, position_id: PositionId) -> Result<Vec<Candidate>> {
        Ok(self.lock_inner()?.candidate.values().filter(|c| c.position_id == position_id).cloned().collect())
    }

    fn upsert_voter(&self, voter: &Voter) -> Result<()> {
        self.lock_inner()?.voter.insert(voter.id, voter.clone());
        Ok(())
    }

    fn get_voter(&self, voter_id: VoterId) -> Result<Option<Voter>> {
        Ok(self.lock_inner()?.voter.get(&voter_id).cloned())
    }

    fn upsert_administrator(&self, admin: &Administrator) -> Result<()> {
        self.lock_inner()?.admin.insert(admin.id, admin.clone());
        Ok(())
    }

    fn get_administrator(&self, admin_id: AdminId) -> Result<Option<Administrator>> {
        Ok(self.lock_inner()?.admin.get(&admin_id).cloned())
    }

    fn apply_ballot_edit(&self, election_id: ElectionId, edit: &BallotEdit, now: DateTime<Utc>) -> Result<Election> {
        let mut inner = self.lock_inner()?;
        let definition = inner.definition(election_id).ok_or(UrnaError::ElectionNotFound(election_id.value()))?;
        let plan = edit.plan(&definition, now)?;
        for id in &plan.delete_candidates {
            inner.candidate.remove(id);
        }
        for id in &plan.delete_positions {
            inner.position.remove(id);
        }
        for position in plan.put_positions {
            inner.position.insert(position.id, position);
        }
        for candidate in plan.put_candidates {
            inner.candidate.insert(candidate.id, candidate);
        }
        let election = plan.election.unwrap_or(definition.election);
        inner.election.insert(election_id, election.clone());
        Ok(election)
    }

    fn compare_and_set_status(&self, election_id: ElectionId, expected: ElectionStatus, next: ElectionStatus, now: DateTime<Utc>) -> Result<Election> {
        let mut inner = self.lock_inner()?;
        let election = inner.election.get_mut(&election_id).ok_or(UrnaError::ElectionNotFound(election_id.value()))?;
        if election.status != expected {
            return Err(UrnaError::InvalidStateTransition { from: election.status.to_string(), to: next.to_string() });
        }
        election.status = next;
        election.updated_at = now;
        Ok(election.clone())
    }

    fn record_seal(&self, record: &SealRecord) -> Result<Election> {
        let mut inner = self.lock_inner()?;
        let election = inner.election.get_mut(&record.election_id).ok_or(UrnaError::ElectionNotFound(record.election_id.value()))?;
        let sealed = apply_seal(election.clone(), record)?;
        *election = sealed.clone();
        inner.seal.insert(record.election_id, record.clone());
        Ok(sealed)
    }

    fn get_seal_record(&self, election_id: ElectionId) -> Result<Option<SealRecord>> {
        Ok(self.lock_inner()?.seal.get(&election_id).cloned())
    }

    fn begin_ballot(&self, election_id: ElectionId, voter_id: VoterId) -> Result<Box<dyn BallotTransaction + '_>> {
        Ok(Box::new(MemoryBallot { storage: self, election_id, voter_id, staged: Vec::new(), receipt: None }))
    }

    fn has_voted(&self, voter_id: VoterId, election_id: ElectionId) -> Result<bool> {
        Ok(self.lock_inner()?.ballot_key.contains_key(&(election_id, voter_id)))
    }

    fn list_votes(&self, election_id: ElectionId) -> Result<Vec<SecureVote>> {
        Ok(self.lock_inner()?.votes.iter().filter(|v| v.election_id == election_id).cloned().collect())
    }

    fn votes_for_transaction(&self, tx_id: &VoteTransactionId) -> Result<Vec<SecureVote>> {
        Ok(self.lock_inner()?.votes.iter().filter(|v| &v.vote_transaction_id == tx_id).cloned().collect())
    }

    fn get_receipt(&self, token: &ReceiptToken) -> Result<Option<VoteReceipt>> {
        Ok(self.lock_inner()?.receipt.get(token).cloned())
    }

    fn insert_report(&self, report: &ReportSnapshot) -> Result<()> {
        let mut inner = self.lock_inner()?;
        if report.kind == ReportKind::Zero {
            if inner.reports.iter().any(|r| r.election_id == report.election_id && r.kind == ReportKind::Zero) {
                return Err(UrnaError::ReportAlreadyExists { election_id: report.election_id.value(), kind: report.kind.to_string() });
            }
            if inner.ballot_key.keys().any(|(election_id, _)| *election_id == report.election_id) {
                return Err(UrnaError::VotesAlreadyCast { election_id: report.election_id.value() });
            }
        }
        inner.reports.push(report.clone());
        Ok(())
    }

    fn get_zero_report(&self, election_id: ElectionId) -> Result<Option<ReportSnapshot>> {
        Ok(self.lock_inner()?.reports.iter().find(|r| r.election_id == election_id && r.kind == ReportKind::Zero).cloned())
    }

    fn list_reports(&self, election_id: ElectionId) -> Result<Vec<ReportSnapshot>> {
        Ok(self.lock_inner()?.reports.iter().filter(|r| r.election_id == election_id).cloned().collect())
    }
}

struct MemoryBallot<'a> {
    storage: &'a MemoryStorage,
    election_id: ElectionId,
    voter_id: VoterId,
    staged: Vec<SecureVote>,
    receipt: Option<VoteReceipt>,
}

impl<'a> BallotTransaction for MemoryBallot<'a> {
    fn stage_vote(&mut self, vote: SecureVote) -> Result<()> {
        ensure_stageable(self.election_id, self.voter_id, &vote)?;
        self.staged.push(vote);
        Ok(())
    }

    fn attach_receipt(&mut self, receipt: VoteReceipt) -> Result<()> {
        ensure_receipt_matches(self.election_id, self.voter_id, &receipt)?;
        self.receipt = Some(receipt);
        Ok(())
    }

    fn staged(&self) -> usize {
        self.staged.len()
    }

    fn commit(self: Box<Self>) -> Result<usize> {
        let MemoryBallot { storage, election_id, voter_id, staged, receipt } = *self;
        let Some(first) = staged.first() else {
            return Err(UrnaError::StorageError { operation: "ballot commit".to_string(), details: "no staged votes".to_string() });
        };
        let tx_id = first.vote_transaction_id.clone();
        let mut inner = storage.lock_inner()?;
        if inner.ballot_key.contains_key(&(election_id, voter_id)) {
            return Err(UrnaError::AlreadyVoted { voter_id: voter_id.value(), election_id: election_id.value() });
        }
        if receipt.as_ref().is_some_and(|r| inner.receipt.contains_key(&r.token)) {
            return Err(duplicate_receipt_token());
        }
        let rows = staged.len();
        inner.ballot_key.insert((election_id, voter_id), tx_id);
        inner.votes.extend(staged);
        if let Some(receipt) = receipt {
            inner.receipt.insert(receipt.token.clone(), receipt);
        }
        Ok(rows)
    }

    fn rollback(self: Box<Self>) {
        drop(self);
    }
}
