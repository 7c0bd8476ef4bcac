use crate::fixtures::*;
use urna_core::domain::election::{compute_seal_hash, BallotEdit};
use urna_core::domain::{Candidate, ElectionStatus, Position};
use urna_core::foundation::{ErrorCategory, PositionId, UrnaError};
use urna_core::infrastructure::storage::ElectionStore;

#[test]
fn seal_records_hash_and_freezes_positions() -> Result<(), UrnaError> {
    let harness = memory_harness(ElectionBuilder::default());
    let expected = compute_seal_hash(&harness.fixture.definition());

    let before = harness.get_seal_status(ELECTION_ID)?;
    assert!(!before.is_sealed);
    assert!(before.can_be_sealed);
    assert!(before.frozen_position_ids.is_empty());

    let result = harness.seal_election(ELECTION_ID, ADMIN_ID)?;
    assert_eq!(result.seal_hash, expected);
    assert_eq!(result.sealed_by, ADMIN_ID);
    assert_eq!(result.sealed_at, voting_open_at());

    let status = harness.get_seal_status(ELECTION_ID)?;
    assert!(status.is_sealed);
    assert!(!status.can_be_sealed);
    assert_eq!(status.status, ElectionStatus::Sealed);
    assert_eq!(status.seal_hash, Some(expected));
    assert_eq!(status.sealed_by, Some(ADMIN_ID));
    assert_eq!(status.frozen_position_ids, vec![POSITION_1, POSITION_2]);

    assert_eq!(harness.test.audit.actions(), vec!["election.seal".to_string()]);
    Ok(())
}

#[test]
fn second_seal_is_a_conflict() {
    let harness = sealed_memory_harness();
    let err = harness.seal_election(ELECTION_ID, ADMIN_ID).unwrap_err();
    assert!(err.is_already_sealed());
    assert_eq!(err.category(), ErrorCategory::Conflict);
}

#[test]
fn ballot_edits_are_rejected_after_seal() {
    let harness = sealed_memory_harness();
    let edits = vec![
        BallotEdit::UpdateDetails { title: Some("Renamed".to_string()), window: None },
        BallotEdit::AddPosition(Position {
            id: PositionId::new(13),
            election_id: ELECTION_ID,
            title: "Secretary".to_string(),
            max_selections: 1,
            display_order: 2,
        }),
        BallotEdit::UpdateCandidate(Candidate {
            id: CANDIDATE_C,
            position_id: POSITION_2,
            name: "Someone else".to_string(),
            number: 31,
            active: true,
        }),
        BallotEdit::RemoveCandidate(CANDIDATE_B),
        BallotEdit::RemovePosition(POSITION_2),
    ];

    for edit in &edits {
        let err = harness.apply_ballot_edit(ELECTION_ID, edit, ADMIN_ID).unwrap_err();
        assert!(matches!(err, UrnaError::ElectionImmutable { .. }), "edit {:?} gave {:?}", edit, err);
    }

    let definition = harness.store.load_ballot(ELECTION_ID).unwrap().unwrap();
    assert_eq!(definition.election.title, harness.fixture.election.title);
    assert_eq!(definition.positions.len(), 2);
    assert_eq!(definition.candidates.len(), 3);
    let rejected = harness.test.audit.actions().iter().filter(|a| *a == "election.edit_rejected").count();
    assert_eq!(rejected, edits.len());
    assert!(harness.validate_seal(ELECTION_ID).unwrap().valid);
}

#[test]
fn edits_before_seal_change_the_hash() -> Result<(), UrnaError> {
    let harness = memory_harness(ElectionBuilder::default());
    let original = compute_seal_hash(&harness.fixture.definition());

    let updated = harness.apply_ballot_edit(
        ELECTION_ID,
        &BallotEdit::UpdateDetails { title: Some("Board election 2024 (revised)".to_string()), window: None },
        ADMIN_ID,
    )?;
    assert_eq!(updated.revision, 1);

    let result = harness.seal_election(ELECTION_ID, ADMIN_ID)?;
    assert_ne!(result.seal_hash, original);
    assert_eq!(harness.store.get_seal_record(ELECTION_ID)?.map(|r| r.revision), Some(1));
    Ok(())
}

#[test]
fn seal_requires_active_status() {
    let harness = memory_harness(ElectionBuilder::default().status(ElectionStatus::Draft));
    let err = harness.seal_election(ELECTION_ID, ADMIN_ID).unwrap_err();
    assert!(matches!(err, UrnaError::InvalidStateTransition { .. }));
    assert!(!harness.get_seal_status(ELECTION_ID).unwrap().can_be_sealed);
}

#[test]
fn seal_requires_a_ballot() {
    let harness = memory_harness(ElectionBuilder::default().without_positions());
    let err = harness.seal_election(ELECTION_ID, ADMIN_ID).unwrap_err();
    assert!(matches!(err, UrnaError::EmptyBallot { .. }));

    let harness = memory_harness(ElectionBuilder::default().inactive_candidate(CANDIDATE_C));
    let err = harness.seal_election(ELECTION_ID, ADMIN_ID).unwrap_err();
    assert!(matches!(err, UrnaError::EmptyBallot { ref reason, .. } if reason.contains("no active candidates")));
}

#[test]
fn seal_requires_authorized_admin() {
    let harness = memory_harness(ElectionBuilder::default());
    assert!(matches!(harness.seal_election(ELECTION_ID, FOREIGN_ADMIN_ID), Err(UrnaError::Unauthorized { .. })));
    assert!(matches!(harness.seal_election(ELECTION_ID, INACTIVE_ADMIN_ID), Err(UrnaError::Unauthorized { .. })));
    assert!(matches!(
        harness.seal_election(ELECTION_ID, urna_core::foundation::AdminId::new(999)),
        Err(UrnaError::AdministratorNotFound(999))
    ));
    assert!(!harness.get_seal_status(ELECTION_ID).unwrap().is_sealed);
}

#[test]
fn seal_of_missing_election_is_not_found() {
    let harness = memory_harness(ElectionBuilder::default());
    let err = harness.seal_election(urna_core::foundation::ElectionId::new(77), ADMIN_ID).unwrap_err();
    assert!(matches!(err, UrnaError::ElectionNotFound(77)));
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[test]
fn validate_seal_detects_out_of_band_change() -> Result<(), UrnaError> {
    let harness = sealed_memory_harness();
    assert!(harness.validate_seal(ELECTION_ID)?.valid);
    assert!(harness.validate_seal(ELECTION_ID)?.valid);

    let mut position = harness.store.get_position(POSITION_1)?.expect("position");
    position.title = "Chair".to_string();
    harness.store.upsert_position(&position)?;

    assert!(!harness.validate_seal(ELECTION_ID)?.valid);
    Ok(())
}

#[test]
fn validate_seal_is_false_for_unsealed_election() -> Result<(), UrnaError> {
    let harness = memory_harness(ElectionBuilder::default());
    assert!(!harness.validate_seal(ELECTION_ID)?.valid);
    Ok(())
}

#[test]
fn reference_writes_cannot_unseal() {
    let harness = sealed_memory_harness();
    let mut election = harness.store.get_election(ELECTION_ID).unwrap().unwrap();
    election.is_sealed = false;
    election.seal_hash = None;
    let err = harness.store.upsert_election(&election).unwrap_err();
    assert!(matches!(err, UrnaError::ElectionImmutable { .. }));
}
