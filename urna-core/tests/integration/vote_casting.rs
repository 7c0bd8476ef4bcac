use crate::fixtures::*;
use urna_core::domain::{Choice, ElectionStatus, Selection, VoteKind};
use urna_core::foundation::{CandidateId, ErrorCategory, PositionId, ReceiptToken, UrnaError, VoterId};
use urna_core::infrastructure::storage::ElectionStore;

fn full_ballot() -> Vec<Selection> {
    vec![Selection::candidate(POSITION_1, CANDIDATE_A), Selection::blank(POSITION_2)]
}

#[test]
fn multi_position_ballot_yields_one_receipt_with_all_details() -> Result<(), UrnaError> {
    let harness = sealed_memory_harness();
    let receipt = harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VOTER_1, None, &test_origin())?;

    assert_eq!(receipt.details.len(), 2);
    let p1 = receipt.details.iter().find(|d| d.position_id == POSITION_1).expect("p1 detail");
    assert_eq!(p1.candidate_id, Some(CANDIDATE_A));
    assert_eq!(p1.candidate_name.as_deref(), Some("Ana Souza"));
    assert_eq!(p1.candidate_number, Some(10));
    assert!(!p1.is_blank && !p1.is_null);
    let p2 = receipt.details.iter().find(|d| d.position_id == POSITION_2).expect("p2 detail");
    assert!(p2.is_blank);
    assert!(p2.candidate_id.is_none());

    assert_eq!(receipt.cast_at, voting_open_at());
    assert_eq!(receipt.masked_national_id, "123.***.***-00");
    assert_eq!(receipt.token.len(), 64);

    let votes = harness.store.votes_for_transaction(&receipt.vote_transaction_id)?;
    assert_eq!(votes.len(), 2);
    let seal_hash = harness.get_seal_status(ELECTION_ID)?.seal_hash.expect("sealed");
    assert!(votes.iter().all(|v| v.seal_hash_at_cast == seal_hash));
    assert!(votes.iter().any(|v| v.kind == VoteKind::Blank));
    assert!(harness.has_voted(VOTER_1, ELECTION_ID)?);
    assert!(!harness.has_voted(VOTER_2, ELECTION_ID)?);

    let actions = harness.test.audit.actions();
    assert!(actions.ends_with(&["receipt.issue".to_string(), "vote.cast".to_string()]));
    Ok(())
}

#[test]
fn receipt_is_retrievable_by_token_only() -> Result<(), UrnaError> {
    let harness = sealed_memory_harness();
    let receipt = harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VOTER_1, None, &test_origin())?;

    let fetched = harness.get_receipt(&receipt.token)?;
    assert_eq!(fetched, receipt);
    let lowercase = ReceiptToken::new(receipt.token.to_ascii_lowercase());
    assert_eq!(harness.get_receipt(&lowercase)?, receipt);

    let err = harness.get_receipt(&ReceiptToken::new("DEADBEEF")).unwrap_err();
    assert!(matches!(err, UrnaError::ReceiptNotFound));
    assert_eq!(err.category(), ErrorCategory::NotFound);
    Ok(())
}

#[test]
fn unsealed_election_never_accepts_votes() {
    let harness = memory_harness(ElectionBuilder::default());
    for now in [before_window(), voting_open_at(), after_window()] {
        harness.test.clock.set(now);
        let err = harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VOTER_1, None, &test_origin()).unwrap_err();
        assert!(matches!(err, UrnaError::ElectionNotSealed { .. }), "at {}: {:?}", now, err);
    }
    assert!(harness.store.list_votes(ELECTION_ID).unwrap().is_empty());
}

#[test]
fn voting_window_distinguishes_not_started_and_ended() {
    let harness = sealed_memory_harness();

    harness.test.clock.set(before_window());
    let err = harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VOTER_1, None, &test_origin()).unwrap_err();
    assert!(matches!(err, UrnaError::VotingNotStarted { ref starts_at, .. } if starts_at == "2024-05-10T11:00:00Z"));

    harness.test.clock.set(after_window());
    let err = harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VOTER_1, None, &test_origin()).unwrap_err();
    assert!(matches!(err, UrnaError::VotingEnded { .. }));

    harness.test.clock.set(utc(2024, 5, 10, 20, 0));
    assert!(harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VOTER_1, None, &test_origin()).is_ok());
}

#[test]
fn second_ballot_from_same_voter_is_rejected() -> Result<(), UrnaError> {
    let harness = sealed_memory_harness();
    harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VOTER_1, None, &test_origin())?;
    let err = harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VOTER_1, None, &test_origin()).unwrap_err();
    assert!(matches!(err, UrnaError::AlreadyVoted { .. }));
    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert_eq!(harness.store.list_votes(ELECTION_ID)?.len(), 2);
    assert_eq!(harness.test.audit.actions().last().map(String::as_str), Some("vote.rejected"));
    Ok(())
}

#[test]
fn ballot_structure_is_validated() {
    let harness = sealed_memory_harness();
    let cast = |selections: &[Selection]| harness.cast_multiple_votes(ELECTION_ID, selections, VOTER_1, None, &test_origin());

    assert!(matches!(cast(&[Selection::candidate(POSITION_1, CANDIDATE_A)]), Err(UrnaError::IncompletePositions { expected: 2, provided: 1 })));
    assert!(matches!(cast(&[]), Err(UrnaError::IncompletePositions { .. })));
    assert!(matches!(
        cast(&[Selection::candidate(POSITION_1, CANDIDATE_A), Selection::blank(POSITION_1)]),
        Err(UrnaError::DuplicatePosition { position_id: 11 })
    ));
    assert!(matches!(
        cast(&[Selection::candidate(POSITION_1, CANDIDATE_A), Selection::blank(PositionId::new(99))]),
        Err(UrnaError::PositionNotInElection { position_id: 99, .. })
    ));
    assert!(matches!(
        cast(&[Selection::candidate(POSITION_1, CANDIDATE_C), Selection::blank(POSITION_2)]),
        Err(UrnaError::InvalidCandidate { candidate_id: 121, position_id: 11, .. })
    ));
    assert!(matches!(
        cast(&[Selection::candidate(POSITION_1, CandidateId::new(999)), Selection::blank(POSITION_2)]),
        Err(UrnaError::InvalidCandidate { .. })
    ));

    assert!(!harness.has_voted(VOTER_1, ELECTION_ID).unwrap());
    assert!(harness.store.list_votes(ELECTION_ID).unwrap().is_empty());
}

#[test]
fn inactive_candidate_is_not_selectable() {
    let harness = memory_harness(ElectionBuilder::default().inactive_candidate(CANDIDATE_B));
    harness.seal_election(ELECTION_ID, ADMIN_ID).expect("seal");
    let err = harness
        .cast_multiple_votes(
            ELECTION_ID,
            &[Selection::candidate(POSITION_1, CANDIDATE_B), Selection::null(POSITION_2)],
            VOTER_1,
            None,
            &test_origin(),
        )
        .unwrap_err();
    assert!(matches!(err, UrnaError::InvalidCandidate { ref reason, .. } if reason.contains("inactive")));
}

#[test]
fn single_position_election_takes_one_selection() -> Result<(), UrnaError> {
    let harness = memory_harness(ElectionBuilder::default().single_position());
    harness.seal_election(ELECTION_ID, ADMIN_ID)?;
    let receipt = harness.cast_vote(ELECTION_ID, POSITION_1, Choice::Null, VOTER_2, None, &test_origin())?;
    assert_eq!(receipt.details.len(), 1);
    assert!(receipt.details[0].is_null);
    Ok(())
}

#[test]
fn voter_must_exist_and_be_active() -> Result<(), UrnaError> {
    let harness = sealed_memory_harness();
    let err = harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VoterId::new(9), None, &test_origin()).unwrap_err();
    assert!(matches!(err, UrnaError::VoterNotFound(9)));

    let mut voter = harness.fixture.voter(VOTER_3).clone();
    voter.active = false;
    harness.store.upsert_voter(&voter)?;
    let err = harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VOTER_3, None, &test_origin()).unwrap_err();
    assert!(matches!(err, UrnaError::VoterInactive { voter_id } if voter_id == VOTER_3.value()));
    Ok(())
}

#[test]
fn justification_is_encrypted_and_bounded() -> Result<(), UrnaError> {
    let harness = sealed_memory_harness();
    let too_long = "x".repeat(harness.settings().max_justification_len + 1);
    let err = harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VOTER_1, Some(&too_long), &test_origin()).unwrap_err();
    assert!(matches!(err, UrnaError::JustificationTooLong { .. }));

    let receipt = harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VOTER_1, Some("  conflict of interest  "), &test_origin())?;
    let votes = harness.store.votes_for_transaction(&receipt.vote_transaction_id)?;
    let blob = votes[0].encrypted_justification.as_ref().expect("justification stored");
    assert!(!blob.windows(8).any(|w| w == b"conflict"));
    assert_eq!(harness.test.crypto.decrypt_justification(blob)?, "conflict of interest");
    Ok(())
}

#[test]
fn closed_elections_reject_votes() -> Result<(), UrnaError> {
    let harness = sealed_memory_harness();
    harness.transition(ELECTION_ID, ElectionStatus::Completed, ADMIN_ID)?;
    let err = harness.cast_multiple_votes(ELECTION_ID, &full_ballot(), VOTER_1, None, &test_origin()).unwrap_err();
    assert!(matches!(err, UrnaError::ElectionClosed { .. }));
    Ok(())
}

#[test]
fn readiness_lists_every_problem() -> Result<(), UrnaError> {
    let harness = memory_harness(ElectionBuilder::default());
    harness.test.clock.set(after_window());
    let readiness = harness.validate_election_for_voting(ELECTION_ID)?;
    assert!(!readiness.is_valid);
    assert_eq!(readiness.errors, vec!["election is not sealed".to_string(), "voting has ended".to_string()]);

    harness.seal_election(ELECTION_ID, ADMIN_ID)?;
    harness.test.clock.set(voting_open_at());
    let readiness = harness.validate_election_for_voting(ELECTION_ID)?;
    assert!(readiness.is_valid, "errors: {:?}", readiness.errors);
    Ok(())
}
