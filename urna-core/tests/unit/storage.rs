use crate::fixtures::*;
use urna_core::domain::election::SealRecord;
use urna_core::domain::{ElectionStatus, ReportKind, ReportSnapshot, SecureVote, VoteKind, VoteReceipt};
use urna_core::foundation::{
    Digest, ElectionId, PositionId, ReceiptToken, ReportHash, ReportId, SealHash, UrnaError, VoteHash, VoteTransactionId, VoterId,
};
use urna_core::infrastructure::storage::{ElectionStore, MemoryStorage, RocksStorage};
use tempfile::TempDir;

fn sample_vote(tx: &str, voter_id: VoterId, position_id: PositionId) -> SecureVote {
    SecureVote {
        vote_transaction_id: VoteTransactionId::new(tx),
        election_id: ELECTION_ID,
        position_id,
        voter_id,
        kind: VoteKind::Blank,
        encrypted_payload: vec![1, 2, 3],
        vote_hash: VoteHash::new([1u8; 32]),
        vote_signature: Digest::new([2u8; 32]),
        creation_hash: Digest::new([3u8; 32]),
        device_fingerprint: Digest::new([4u8; 32]),
        seal_hash_at_cast: SealHash::new([5u8; 32]),
        encrypted_justification: None,
        cast_at: voting_open_at(),
        origin_address: None,
        origin_user_agent: None,
    }
}

fn sample_report(kind: ReportKind) -> ReportSnapshot {
    ReportSnapshot {
        report_id: ReportId::generate(),
        election_id: ELECTION_ID,
        kind,
        election_title: "Board election 2024".to_string(),
        seal_hash: None,
        generated_at: voting_open_at(),
        generated_by: ADMIN_ID,
        origin_address: None,
        positions: Vec::new(),
        total_ballots: 0,
        skipped_votes: 0,
        content_hash: ReportHash::default(),
    }
}

fn sample_receipt(token: &str, voter_id: VoterId) -> VoteReceipt {
    VoteReceipt {
        token: ReceiptToken::new(token),
        vote_hashes: vec![VoteHash::new([1u8; 32])],
        voter_id,
        election_id: ELECTION_ID,
        issued_at: voting_open_at(),
        body: "{}".to_string(),
    }
}

fn seal_record(revision: u64) -> SealRecord {
    SealRecord {
        election_id: ELECTION_ID,
        seal_hash: SealHash::new([5u8; 32]),
        sealed_at: voting_open_at(),
        sealed_by: ADMIN_ID,
        position_ids: vec![POSITION_1, POSITION_2],
        revision,
    }
}

fn check_ballot_commit_claims_voter(store: &dyn ElectionStore) {
    let mut ballot = store.begin_ballot(ELECTION_ID, VOTER_1).expect("begin");
    ballot.stage_vote(sample_vote("tx-1", VOTER_1, POSITION_1)).expect("stage");
    ballot.stage_vote(sample_vote("tx-1", VOTER_1, POSITION_2)).expect("stage");
    assert_eq!(ballot.staged(), 2);
    assert_eq!(ballot.commit().expect("commit"), 2);

    assert!(store.has_voted(VOTER_1, ELECTION_ID).expect("has_voted"));
    assert!(!store.has_voted(VOTER_1, ElectionId::new(2)).expect("has_voted"));
    assert_eq!(store.votes_for_transaction(&VoteTransactionId::new("tx-1")).expect("by tx").len(), 2);

    let mut again = store.begin_ballot(ELECTION_ID, VOTER_1).expect("begin");
    again.stage_vote(sample_vote("tx-2", VOTER_1, POSITION_1)).expect("stage");
    let err = again.commit().unwrap_err();
    assert!(matches!(err, UrnaError::AlreadyVoted { voter_id: 1000, election_id: 1 }));
    assert_eq!(store.list_votes(ELECTION_ID).expect("list").len(), 2);
    assert!(store.votes_for_transaction(&VoteTransactionId::new("tx-2")).expect("by tx").is_empty());
}

fn check_rollback_and_empty_commit(store: &dyn ElectionStore) {
    let mut ballot = store.begin_ballot(ELECTION_ID, VOTER_2).expect("begin");
    ballot.stage_vote(sample_vote("tx-r", VOTER_2, POSITION_1)).expect("stage");
    ballot.rollback();
    assert!(!store.has_voted(VOTER_2, ELECTION_ID).expect("has_voted"));

    let mut foreign = store.begin_ballot(ELECTION_ID, VOTER_2).expect("begin");
    assert!(matches!(foreign.stage_vote(sample_vote("tx-f", VOTER_3, POSITION_1)), Err(UrnaError::StorageError { .. })));
    assert!(foreign.commit().is_err());
    assert!(!store.has_voted(VOTER_2, ELECTION_ID).expect("has_voted"));
    assert!(store.list_votes(ELECTION_ID).expect("list").is_empty());
}

fn check_receipt_commits_with_ballot(store: &dyn ElectionStore) {
    let mut ballot = store.begin_ballot(ELECTION_ID, VOTER_1).expect("begin");
    ballot.stage_vote(sample_vote("tx-1", VOTER_1, POSITION_1)).expect("stage");
    ballot.attach_receipt(sample_receipt("AA01", VOTER_1)).expect("attach");
    ballot.commit().expect("commit");
    assert_eq!(store.get_receipt(&ReceiptToken::new("AA01")).expect("get"), Some(sample_receipt("AA01", VOTER_1)));

    // A token collision aborts the whole ballot.
    let mut clash = store.begin_ballot(ELECTION_ID, VOTER_2).expect("begin");
    clash.stage_vote(sample_vote("tx-2", VOTER_2, POSITION_1)).expect("stage");
    clash.attach_receipt(sample_receipt("AA01", VOTER_2)).expect("attach");
    assert!(matches!(clash.commit(), Err(UrnaError::StorageError { .. })));
    assert!(!store.has_voted(VOTER_2, ELECTION_ID).expect("has_voted"));
    assert!(store.votes_for_transaction(&VoteTransactionId::new("tx-2")).expect("by tx").is_empty());
    assert_eq!(store.get_receipt(&ReceiptToken::new("AA01")).expect("get").map(|r| r.voter_id), Some(VOTER_1));

    let mut mismatched = store.begin_ballot(ELECTION_ID, VOTER_3).expect("begin");
    assert!(matches!(mismatched.attach_receipt(sample_receipt("BB02", VOTER_1)), Err(UrnaError::StorageError { .. })));
}

fn check_zero_report_after_commit(store: &dyn ElectionStore) {
    let mut ballot = store.begin_ballot(ELECTION_ID, VOTER_1).expect("begin");
    ballot.stage_vote(sample_vote("tx-1", VOTER_1, POSITION_1)).expect("stage");
    ballot.commit().expect("commit");

    let err = store.insert_report(&sample_report(ReportKind::Zero)).unwrap_err();
    assert!(matches!(err, UrnaError::VotesAlreadyCast { election_id: 1 }));
    assert!(store.get_zero_report(ELECTION_ID).expect("zero").is_none());
    store.insert_report(&sample_report(ReportKind::Counting)).expect("counting");
}

fn check_report_uniqueness(store: &dyn ElectionStore) {
    let zero = sample_report(ReportKind::Zero);
    store.insert_report(&zero).expect("zero");
    let err = store.insert_report(&sample_report(ReportKind::Zero)).unwrap_err();
    assert!(matches!(err, UrnaError::ReportAlreadyExists { .. }));

    store.insert_report(&sample_report(ReportKind::Counting)).expect("counting 1");
    store.insert_report(&sample_report(ReportKind::Counting)).expect("counting 2");
    assert_eq!(store.list_reports(ELECTION_ID).expect("list").len(), 3);
    assert_eq!(store.get_zero_report(ELECTION_ID).expect("zero").map(|r| r.report_id), Some(zero.report_id));
}

fn check_seal_guards(store: &dyn ElectionStore) {
    ElectionBuilder::default().status(ElectionStatus::Draft).build().seed(store).expect("seed");
    let err = store.record_seal(&seal_record(0)).unwrap_err();
    assert!(matches!(err, UrnaError::InvalidStateTransition { .. }));

    let election = store
        .compare_and_set_status(ELECTION_ID, ElectionStatus::Draft, ElectionStatus::Active, voting_open_at())
        .expect("activate");
    assert_eq!(election.status, ElectionStatus::Active);
    let err = store
        .compare_and_set_status(ELECTION_ID, ElectionStatus::Draft, ElectionStatus::Cancelled, voting_open_at())
        .unwrap_err();
    assert!(matches!(err, UrnaError::InvalidStateTransition { .. }));

    let sealed = store.record_seal(&seal_record(0)).expect("seal");
    assert!(sealed.is_sealed);
    assert!(store.record_seal(&seal_record(0)).unwrap_err().is_already_sealed());
    assert_eq!(store.get_seal_record(ELECTION_ID).expect("record"), Some(seal_record(0)));

    let mut unsealed = sealed.clone();
    unsealed.is_sealed = false;
    unsealed.seal_hash = None;
    assert!(matches!(store.upsert_election(&unsealed), Err(UrnaError::ElectionImmutable { .. })));
    let mut retitled = sealed;
    retitled.updated_at = after_window();
    store.upsert_election(&retitled).expect("seal-preserving write");
}

#[test]
fn memory_ballot_commit_claims_voter() {
    check_ballot_commit_claims_voter(&MemoryStorage::new());
}

#[test]
fn rocksdb_ballot_commit_claims_voter() {
    let temp_dir = TempDir::new().expect("temp dir");
    check_ballot_commit_claims_voter(&RocksStorage::open_in_dir(temp_dir.path()).expect("open rocksdb"));
}

#[test]
fn memory_rollback_leaves_nothing() {
    check_rollback_and_empty_commit(&MemoryStorage::new());
}

#[test]
fn rocksdb_rollback_leaves_nothing() {
    let temp_dir = TempDir::new().expect("temp dir");
    check_rollback_and_empty_commit(&RocksStorage::open_in_dir(temp_dir.path()).expect("open rocksdb"));
}

#[test]
fn memory_zero_report_is_unique() {
    check_report_uniqueness(&MemoryStorage::new());
}

#[test]
fn rocksdb_zero_report_is_unique() {
    let temp_dir = TempDir::new().expect("temp dir");
    check_report_uniqueness(&RocksStorage::open_in_dir(temp_dir.path()).expect("open rocksdb"));
}

#[test]
fn memory_seal_guards() {
    check_seal_guards(&MemoryStorage::new());
}

#[test]
fn rocksdb_seal_guards() {
    let temp_dir = TempDir::new().expect("temp dir");
    check_seal_guards(&RocksStorage::open_in_dir(temp_dir.path()).expect("open rocksdb"));
}

#[test]
fn memory_receipt_commits_with_ballot() {
    check_receipt_commits_with_ballot(&MemoryStorage::new());
}

#[test]
fn rocksdb_receipt_commits_with_ballot() {
    let temp_dir = TempDir::new().expect("temp dir");
    check_receipt_commits_with_ballot(&RocksStorage::open_in_dir(temp_dir.path()).expect("open rocksdb"));
}

#[test]
fn memory_zero_report_refused_after_commit() {
    check_zero_report_after_commit(&MemoryStorage::new());
}

#[test]
fn rocksdb_zero_report_refused_after_commit() {
    let temp_dir = TempDir::new().expect("temp dir");
    check_zero_report_after_commit(&RocksStorage::open_in_dir(temp_dir.path()).expect("open rocksdb"));
}

#[test]
fn rocksdb_refuses_empty_data_dir() {
    assert!(matches!(RocksStorage::open_in_dir(""), Err(UrnaError::StorageError { .. })));
}
