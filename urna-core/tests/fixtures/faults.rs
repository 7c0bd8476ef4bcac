#![allow(dead_code)]

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use urna_core::domain::election::SealRecord;
use urna_core::domain::{Administrator, BallotEdit, Candidate, Election, ElectionStatus, Position, ReportSnapshot, SecureVote, Voter, VoteReceipt};
use urna_core::foundation::{AdminId, CandidateId, ElectionId, PositionId, ReceiptToken, UrnaError, VoteTransactionId, VoterId};
use urna_core::infrastructure::storage::{BallotTransaction, ElectionStore, Result};

/// Delegating store with injectable faults.
///
/// - `fail_on_stage`: staging row number `n` (1-based) fails; `0` never fails.
/// - `fail_receipt_write`: a commit carrying a receipt fails before anything is written.
/// - `stale_vote_listing`: `list_votes` reports an empty ledger, as a read taken just before
///   a concurrent ballot committed would.
pub struct FailingStore {
    inner: Arc<dyn ElectionStore>,
    fail_on_stage: usize,
    fail_receipt_write: bool,
    stale_vote_listing: bool,
    pub failures: Arc<AtomicUsize>,
}

impl FailingStore {
    pub fn new(inner: Arc<dyn ElectionStore>, fail_on_stage: usize) -> Self {
        Self { inner, fail_on_stage, fail_receipt_write: false, stale_vote_listing: false, failures: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn failing_receipt_write(inner: Arc<dyn ElectionStore>) -> Self {
        Self { fail_receipt_write: true, ..Self::new(inner, 0) }
    }

    pub fn with_stale_vote_listing(inner: Arc<dyn ElectionStore>) -> Self {
        Self { stale_vote_listing: true, ..Self::new(inner, 0) }
    }
}

struct FailingBallot<'a> {
    inner: Box<dyn BallotTransaction + 'a>,
    fail_on_stage: usize,
    fail_receipt_write: bool,
    has_receipt: bool,
    attempts: usize,
    failures: Arc<AtomicUsize>,
}

impl BallotTransaction for FailingBallot<'_> {
    fn stage_vote(&mut self, vote: SecureVote) -> Result<()> {
        self.attempts += 1;
        if self.attempts == self.fail_on_stage {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(UrnaError::StorageError { operation: "stage_vote".to_string(), details: "injected failure".to_string() });
        }
        self.inner.stage_vote(vote)
    }

    fn attach_receipt(&mut self, receipt: VoteReceipt) -> Result<()> {
        self.has_receipt = true;
        self.inner.attach_receipt(receipt)
    }

    fn staged(&self) -> usize {
        self.inner.staged()
    }

    fn commit(self: Box<Self>) -> Result<usize> {
        if self.fail_receipt_write && self.has_receipt {
            self.failures.fetch_add(1, Ordering::SeqCst);
            self.inner.rollback();
            return Err(UrnaError::StorageError { operation: "ballot commit".to_string(), details: "injected receipt failure".to_string() });
        }
        self.inner.commit()
    }

    fn rollback(self: Box<Self>) {
        self.inner.rollback()
    }
}

impl ElectionStore for FailingStore {
    fn upsert_election(&self, election: &Election) -> Result<()> {
        self.inner.upsert_election(election)
    }
    fn get_election(&self, election_id: ElectionId) -> Result<Option<Election>> {
        self.inner.get_election(election_id)
    }
    fn list_elections(&self) -> Result<Vec<Election>> {
        self.inner.list_elections()
    }
    fn upsert_position(&self, position: &Position) -> Result<()> {
        self.inner.upsert_position(position)
    }
    fn get_position(&self, position_id: PositionId) -> Result<Option<Position>> {
        self.inner.get_position(position_id)
    }
    fn list_positions(&self, election_id: ElectionId) -> Result<Vec<Position>> {
        self.inner.list_positions(election_id)
    }
    fn upsert_candidate(&self, candidate: &Candidate) -> Result<()> {
        self.inner.upsert_candidate(candidate)
    }
    fn get_candidate(&self, candidate_id: CandidateId) -> Result<Option<Candidate>> {
        self.inner.get_candidate(candidate_id)
    }
    fn list_candidates(&self, position_id: PositionId) -> Result<Vec<Candidate>> {
        self.inner.list_candidates(position_id)
    }
    fn upsert_voter(&self, voter: &Voter) -> Result<()> {
        self.inner.upsert_voter(voter)
    }
    fn get_voter(&self, voter_id: VoterId) -> Result<Option<Voter>> {
        self.inner.get_voter(voter_id)
    }
    fn upsert_administrator(&self, admin: &Administrator) -> Result<()> {
        self.inner.upsert_administrator(admin)
    }
    fn get_administrator(&self, admin_id: AdminId) -> Result<Option<Administrator>> {
        self.inner.get_administrator(admin_id)
    }
    fn apply_ballot_edit(&self, election_id: ElectionId, edit: &BallotEdit, now: DateTime<Utc>) -> Result<Election> {
        self.inner.apply_ballot_edit(election_id, edit, now)
    }
    fn compare_and_set_status(&self, election_id: ElectionId, expected: ElectionStatus, next: ElectionStatus, now: DateTime<Utc>) -> Result<Election> {
        self.inner.compare_and_set_status(election_id, expected, next, now)
    }
    fn record_seal(&self, record: &SealRecord) -> Result<Election> {
        self.inner.record_seal(record)
    }
    fn get_seal_record(&self, election_id: ElectionId) -> Result<Option<SealRecord>> {
        self.inner.get_seal_record(election_id)
    }
    fn begin_ballot(&self, election_id: ElectionId, voter_id: VoterId) -> Result<Box<dyn BallotTransaction + '_>> {
        let inner = self.inner.begin_ballot(election_id, voter_id)?;
        Ok(Box::new(FailingBallot {
            inner,
            fail_on_stage: self.fail_on_stage,
            fail_receipt_write: self.fail_receipt_write,
            has_receipt: false,
            attempts: 0,
            failures: self.failures.clone(),
        }))
    }
    fn has_voted(&self, voter_id: VoterId, election_id: ElectionId) -> Result<bool> {
        self.inner.has_voted(voter_id, election_id)
    }
    fn list_votes(&self, election_id: ElectionId) -> Result<Vec<SecureVote>> {
        if self.stale_vote_listing {
            return Ok(Vec::new());
        }
        self.inner.list_votes(election_id)
    }
    fn votes_for_transaction(&self, tx_id: &VoteTransactionId) -> Result<Vec<SecureVote>> {
        self.inner.votes_for_transaction(tx_id)
    }
    fn get_receipt(&self, token: &ReceiptToken) -> Result<Option<VoteReceipt>> {
        self.inner.get_receipt(token)
    }
    fn insert_report(&self, report: &ReportSnapshot) -> Result<()> {
        self.inner.insert_report(report)
    }
    fn get_zero_report(&self, election_id: ElectionId) -> Result<Option<ReportSnapshot>> {
        self.inner.get_zero_report(election_id)
    }
    fn list_reports(&self, election_id: ElectionId) -> Result<Vec<ReportSnapshot>> {
        self.inner.list_reports(election_id)
    }
}
