use super::RocksStorage;
use crate::domain::{SecureVote, VoteReceipt};
use crate::foundation::{ElectionId, UrnaError, VoterId};
use crate::infrastructure::storage::rocks::schema::*;
use crate::infrastructure::storage::rocks::util::acquire_with_timeout;
use crate::infrastructure::storage::traits::{duplicate_receipt_token, ensure_receipt_matches, ensure_stageable};
use crate::infrastructure::storage::BallotTransaction;
use crate::storage_err;
use log::debug;
use rocksdb::WriteBatch;

pub(super) struct RocksBallot<'a> {
    pub(super) storage: &'a RocksStorage,
    pub(super) election_id: ElectionId,
    pub(super) voter_id: VoterId,
    pub(super) staged: Vec<SecureVote>,
    pub(super) receipt: Option<VoteReceipt>,
}

impl<'a> BallotTransaction for RocksBallot<'a> {
    fn stage_vote(&mut self, vote: SecureVote) -> Result<(), UrnaError> {
        ensure_stageable(self.election_id, self.voter_id, &vote)?;
        if let Some(first) = self.staged.first() {
            if first.vote_transaction_id != vote.vote_transaction_id {
                return Err(UrnaError::StorageError {
                    operation: "stage_vote".to_string(),
                    details: "ballot rows must share one vote transaction id".to_string(),
                });
            }
        }
        self.staged.push(vote);
        Ok(())
    }

    fn attach_receipt(&mut self, receipt: VoteReceipt) -> Result<(), UrnaError> {
        ensure_receipt_matches(self.election_id, self.voter_id, &receipt)?;
        self.receipt = Some(receipt);
        Ok(())
    }

    fn staged(&self) -> usize {
        self.staged.len()
    }

    fn commit(self: Box<Self>) -> Result<usize, UrnaError> {
        let RocksBallot { storage, election_id, voter_id, staged, receipt } = *self;
        let Some(first) = staged.first() else {
            return Err(UrnaError::StorageError { operation: "ballot commit".to_string(), details: "no staged votes".to_string() });
        };
        let tx_id = first.vote_transaction_id.clone();

        let _guard = acquire_with_timeout(&storage.ledger_lock, "rocks ledger lock")?;
        let ballot_key = RocksStorage::key_ballot(election_id, voter_id);
        if storage.key_exists(CF_BALLOT_KEY, &ballot_key)? {
            return Err(UrnaError::AlreadyVoted { voter_id: voter_id.value(), election_id: election_id.value() });
        }
        if let Some(receipt) = &receipt {
            if storage.key_exists(CF_RECEIPT, receipt.token.as_bytes())? {
                return Err(duplicate_receipt_token());
            }
        }

        let cf_vote = storage.cf_handle(CF_VOTE)?;
        let cf_vote_tx = storage.cf_handle(CF_VOTE_TX)?;
        let cf_ballot = storage.cf_handle(CF_BALLOT_KEY)?;
        let mut batch = WriteBatch::default();
        for vote in &staged {
            let vote_key = RocksStorage::key_vote(election_id, vote.vote_transaction_id.as_str(), vote.position_id);
            batch.put_cf(cf_vote_tx, RocksStorage::key_vote_tx(tx_id.as_str(), vote.position_id), RocksStorage::encode(&vote_key)?);
            batch.put_cf(cf_vote, vote_key, RocksStorage::encode(vote)?);
        }
        batch.put_cf(cf_ballot, ballot_key, RocksStorage::encode(&tx_id)?);
        if let Some(receipt) = &receipt {
            batch.put_cf(storage.cf_handle(CF_RECEIPT)?, receipt.token.as_bytes(), RocksStorage::encode(receipt)?);
        }
        storage.db.write(batch).map_err(|err| storage_err!("rocksdb write ballot", err))?;
        debug!(
            "ballot committed election_id={} voter_id={} rows={} receipt={}",
            election_id,
            voter_id,
            staged.len(),
            receipt.is_some()
        );
        Ok(staged.len())
    }

    fn rollback(self: Box<Self>) {
        drop(self);
    }
}
