use super::batch::RocksBallot;
use super::RocksStorage;
use crate::domain::election::{Administrator, BallotEdit, Candidate, Election, ElectionStatus, Position, SealRecord, Voter};
use crate::domain::{ReportKind, ReportSnapshot, SecureVote, VoteReceipt};
use crate::foundation::{AdminId, CandidateId, ElectionId, PositionId, ReceiptToken, ReportId, UrnaError, VoteTransactionId, VoterId};
use crate::infrastructure::storage::rocks::schema::*;
use crate::infrastructure::storage::rocks::util::acquire_with_timeout;
use crate::infrastructure::storage::traits::{apply_seal, ensure_seal_preserved};
use crate::infrastructure::storage::{BallotTransaction, ElectionStore};
use crate::storage_err;
use chrono::{DateTime, Utc};
use log::{debug, trace};
use rocksdb::WriteBatch;

impl ElectionStore for RocksStorage {
    fn upsert_election(&self, election: &Election) -> Result<(), UrnaError> {
        trace!("upsert_election election_id={}", election.id);
        let _guard = acquire_with_timeout(&self.election_lock, "rocks election lock")?;
        let key = Self::key_id(election.id.value());
        let stored: Option<Election> = self.get_decoded(CF_ELECTION, &key)?;
        ensure_seal_preserved(stored.as_ref(), election)?;
        self.put_encoded(CF_ELECTION, &key, election)
    }

    fn get_election(&self, election_id: ElectionId) -> Result<Option<Election>, UrnaError> {
        self.get_decoded(CF_ELECTION, &Self::key_id(election_id.value()))
    }

    fn list_elections(&self) -> Result<Vec<Election>, UrnaError> {
        self.scan_prefix(CF_ELECTION, &[])
    }

    fn upsert_position(&self, position: &Position) -> Result<(), UrnaError> {
        trace!("upsert_position position_id={} election_id={}", position.id, position.election_id);
        self.put_encoded(CF_POSITION, &Self::key_id(position.id.value()), position)
    }

    fn get_position(&self, position_id: PositionId) -> Result<Option<Position>, UrnaError> {
        self.get_decoded(CF_POSITION, &Self::key_id(position_id.value()))
    }

    fn list_positions(&self, election_id: ElectionId) -> Result<Vec<Position>, UrnaError> {
        let all: Vec<Position> = self.scan_prefix(CF_POSITION, &[])?;
        Ok(all.into_iter().filter(|p| p.election_id == election_id).collect())
    }

    fn upsert_candidate(&self, candidate: &Candidate) -> Result<(), UrnaError> {
        trace!("upsert_candidate candidate_id={} position_id={}", candidate.id, candidate.position_id);
        self.put_encoded(CF_CANDIDATE, &Self::key_id(candidate.id.value()), candidate)
    }

    fn get_candidate(&self, candidate_id: CandidateId) -> Result<Option<Candidate>, UrnaError> {
        self.get_decoded(CF_CANDIDATE, &Self::key_id(candidate_id.value()))
    }

    fn list_candidates(&self, position_id: PositionId) -> Result<Vec<Candidate>, UrnaError> {
        let all: Vec<Candidate> = self.scan_prefix(CF_CANDIDATE, &[])?;
        Ok(all.into_iter().filter(|c| c.position_id == position_id).collect())
    }

    fn upsert_voter(&self, voter: &Voter) -> Result<(), UrnaError> {
        self.put_encoded(CF_VOTER, &Self::key_id(voter.id.value()), voter)
    }

    fn get_voter(&self, voter_id: VoterId) -> Result<Option<Voter>, UrnaError> {
        self.get_decoded(CF_VOTER, &Self::key_id(voter_id.value()))
    }

    fn upsert_administrator(&self, admin: &Administrator) -> Result<(), UrnaError> {
        self.put_encoded(CF_ADMIN, &Self::key_id(admin.id.value()), admin)
    }

    fn get_administrator(&self, admin_id: AdminId) -> Result<Option<Administrator>, UrnaError> {
        self.get_decoded(CF_ADMIN, &Self::key_id(admin_id.value()))
    }

    fn apply_ballot_edit(&self, election_id: ElectionId, edit: &BallotEdit, now: DateTime<Utc>) -> Result<Election, UrnaError> {
        let _guard = acquire_with_timeout(&self.election_lock, "rocks election lock")?;
        let definition = self.load_ballot(election_id)?.ok_or(UrnaError::ElectionNotFound(election_id.value()))?;
        let plan = edit.plan(&definition, now)?;

        let cf_election = self.cf_handle(CF_ELECTION)?;
        let cf_position = self.cf_handle(CF_POSITION)?;
        let cf_candidate = self.cf_handle(CF_CANDIDATE)?;
        let mut batch = WriteBatch::default();
        for id in &plan.delete_candidates {
            batch.delete_cf(cf_candidate, Self::key_id(id.value()));
        }
        for id in &plan.delete_positions {
            batch.delete_cf(cf_position, Self::key_id(id.value()));
        }
        for position in &plan.put_positions {
            batch.put_cf(cf_position, Self::key_id(position.id.value()), Self::encode(position)?);
        }
        for candidate in &plan.put_candidates {
            batch.put_cf(cf_candidate, Self::key_id(candidate.id.value()), Self::encode(candidate)?);
        }
        let election = plan.election.unwrap_or(definition.election);
        batch.put_cf(cf_election, Self::key_id(election_id.value()), Self::encode(&election)?);
        self.db.write(batch).map_err(|err| storage_err!("rocksdb write ballot_edit", err))?;
        debug!("ballot edit applied election_id={} field={} revision={}", election_id, edit.field(), election.revision);
        Ok(election)
    }

    fn compare_and_set_status(
        &self,
        election_id: ElectionId,
        expected: ElectionStatus,
        next: ElectionStatus,
        now: DateTime<Utc>,
    ) -> Result<Election, UrnaError> {
        let _guard = acquire_with_timeout(&self.election_lock, "rocks election lock")?;
        let key = Self::key_id(election_id.value());
        let mut election: Election = self.get_decoded(CF_ELECTION, &key)?.ok_or(UrnaError::ElectionNotFound(election_id.value()))?;
        if election.status != expected {
            return Err(UrnaError::InvalidStateTransition { from: election.status.to_string(), to: next.to_string() });
        }
        election.status = next;
        election.updated_at = now;
        self.put_encoded(CF_ELECTION, &key, &election)?;
        Ok(election)
    }

    fn record_seal(&self, record: &SealRecord) -> Result<Election, UrnaError> {
        let _guard = acquire_with_timeout(&self.election_lock, "rocks election lock")?;
        let key = Self::key_id(record.election_id.value());
        let election: Election = self.get_decoded(CF_ELECTION, &key)?.ok_or(UrnaError::ElectionNotFound(record.election_id.value()))?;
        let sealed = apply_seal(election, record)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf_handle(CF_ELECTION)?, &key, Self::encode(&sealed)?);
        batch.put_cf(self.cf_handle(CF_SEAL)?, &key, Self::encode(record)?);
        self.db.write(batch).map_err(|err| storage_err!("rocksdb write seal", err))?;
        Ok(sealed)
    }

    fn get_seal_record(&self, election_id: ElectionId) -> Result<Option<SealRecord>, UrnaError> {
        self.get_decoded(CF_SEAL, &Self::key_id(election_id.value()))
    }

    fn begin_ballot(&self, election_id: ElectionId, voter_id: VoterId) -> Result<Box<dyn BallotTransaction + '_>, UrnaError> {
        Ok(Box::new(RocksBallot { storage: self, election_id, voter_id, staged: Vec::new(), receipt: None }))
    }

    fn has_voted(&self, voter_id: VoterId, election_id: ElectionId) -> Result<bool, UrnaError> {
        self.key_exists(CF_BALLOT_KEY, &Self::key_ballot(election_id, voter_id))
    }

    fn list_votes(&self, election_id: ElectionId) -> Result<Vec<SecureVote>, UrnaError> {
        self.scan_prefix(CF_VOTE, &Self::key_election_prefix(election_id))
    }

    fn votes_for_transaction(&self, tx_id: &VoteTransactionId) -> Result<Vec<SecureVote>, UrnaError> {
        let vote_keys: Vec<Vec<u8>> = self.scan_prefix(CF_VOTE_TX, &Self::key_vote_tx_prefix(tx_id.as_str()))?;
        let mut votes = Vec::with_capacity(vote_keys.len());
        for key in vote_keys {
            if let Some(vote) = self.get_decoded(CF_VOTE, &key)? {
                votes.push(vote);
            }
        }
        Ok(votes)
    }

    fn get_receipt(&self, token: &ReceiptToken) -> Result<Option<VoteReceipt>, UrnaError> {
        self.get_decoded(CF_RECEIPT, token.as_bytes())
    }

    fn insert_report(&self, report: &ReportSnapshot) -> Result<(), UrnaError> {
        let _guard = acquire_with_timeout(&self.report_lock, "rocks report lock")?;
        let election_key = Self::key_id(report.election_id.value());
        let key = Self::key_report(report.election_id, report.report_id.as_str());
        let mut batch = WriteBatch::default();
        batch.put_cf(self.cf_handle(CF_REPORT)?, key, Self::encode(report)?);
        if report.kind != ReportKind::Zero {
            return self.db.write(batch).map_err(|err| storage_err!("rocksdb write report", err));
        }

        if self.key_exists(CF_ZERO_REPORT, &election_key)? {
            return Err(UrnaError::ReportAlreadyExists { election_id: report.election_id.value(), kind: report.kind.to_string() });
        }
        batch.put_cf(self.cf_handle(CF_ZERO_REPORT)?, &election_key, Self::encode(&report.report_id)?);
        // Ballot commits take the ledger lock; holding it keeps the empty-box check and the write together.
        let _ledger = acquire_with_timeout(&self.ledger_lock, "rocks ledger lock")?;
        if self.has_prefix(CF_BALLOT_KEY, &Self::key_election_prefix(report.election_id))? {
            return Err(UrnaError::VotesAlreadyCast { election_id: report.election_id.value() });
        }
        self.db.write(batch).map_err(|err| storage_err!("rocksdb write zero report", err))
    }

    fn get_zero_report(&self, election_id: ElectionId) -> Result<Option<ReportSnapshot>, UrnaError> {
        let Some(report_id) = self.get_decoded::<ReportId>(CF_ZERO_REPORT, &Self::key_id(election_id.value()))? else {
            return Ok(None);
        };
        self.get_decoded(CF_REPORT, &Self::key_report(election_id, report_id.as_str()))
    }

    fn list_reports(&self, election_id: ElectionId) -> Result<Vec<ReportSnapshot>, UrnaError> {
        let prefix = Self::key_election_prefix(election_id);
        self.scan_prefix(CF_REPORT, &prefix)
    }

    fn health_check(&self) -> Result<(), UrnaError> {
        self.schema_version()?.map(|_| ()).ok_or_else(|| UrnaError::StorageError {
            operation: "health_check".to_string(),
            details: "schema version missing".to_string(),
        })
    }
}
