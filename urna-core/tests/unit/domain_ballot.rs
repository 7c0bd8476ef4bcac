use crate::fixtures::*;
use urna_core::domain::ballot::{validate_ballot, validate_justification};
use urna_core::domain::report::{tally_votes, zero_tally, DecodedVote};
use urna_core::domain::{Choice, Selection, VoteKind};
use urna_core::foundation::{CandidateId, UrnaError};

#[test]
fn test_full_ballot_resolves_candidates_in_selection_order() {
    let definition = ElectionBuilder::default().build().definition();
    let resolved = validate_ballot(&definition, &[Selection::null(POSITION_2), Selection::candidate(POSITION_1, CANDIDATE_B)])
        .expect("valid");
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].position.id, POSITION_2);
    assert!(resolved[0].candidate.is_none());
    assert_eq!(resolved[1].candidate.as_ref().map(|c| c.name.as_str()), Some("Bruno Lima"));
}

#[test]
fn test_single_position_ballot_accepts_blank() {
    let definition = ElectionBuilder::default().single_position().build().definition();
    let resolved = validate_ballot(&definition, &[Selection::blank(POSITION_1)]).expect("valid");
    assert_eq!(resolved[0].choice, Choice::Blank);
}

#[test]
fn test_structure_errors_come_before_candidate_errors() {
    let definition = ElectionBuilder::default().build().definition();
    let err = validate_ballot(&definition, &[Selection::candidate(POSITION_1, CandidateId::new(404))]).unwrap_err();
    assert!(matches!(err, UrnaError::IncompletePositions { expected: 2, provided: 1 }));
}

#[test]
fn test_candidate_from_other_position_is_rejected() {
    let definition = ElectionBuilder::default().build().definition();
    let err = validate_ballot(&definition, &[Selection::candidate(POSITION_1, CANDIDATE_A), Selection::candidate(POSITION_2, CANDIDATE_A)])
        .unwrap_err();
    assert!(matches!(err, UrnaError::InvalidCandidate { candidate_id: 111, position_id: 12, .. }));
}

#[test]
fn test_justification_limit_is_inclusive() {
    assert!(validate_justification(Some(&"a".repeat(10)), 10).is_ok());
    assert!(matches!(validate_justification(Some(&"a".repeat(11)), 10), Err(UrnaError::JustificationTooLong { len: 11, max: 10 })));
    assert!(validate_justification(None, 0).is_ok());
}

#[test]
fn test_tally_counts_kinds_and_weights() {
    let definition = ElectionBuilder::default().build().definition();
    let votes = [
        DecodedVote { position_id: POSITION_1, kind: VoteKind::Candidate, candidate_id: Some(CANDIDATE_A), weight: 4 },
        DecodedVote { position_id: POSITION_1, kind: VoteKind::Candidate, candidate_id: Some(CANDIDATE_A), weight: 1 },
        DecodedVote { position_id: POSITION_1, kind: VoteKind::Blank, candidate_id: None, weight: 2 },
        DecodedVote { position_id: POSITION_2, kind: VoteKind::Null, candidate_id: None, weight: 1 },
        DecodedVote { position_id: POSITION_2, kind: VoteKind::Candidate, candidate_id: Some(CANDIDATE_A), weight: 1 },
    ];
    let outcome = tally_votes(&definition, &votes);
    assert_eq!(outcome.unattributed, 1);

    let president = &outcome.positions[0];
    assert_eq!(president.position_id, POSITION_1);
    assert_eq!((president.candidates[0].votes, president.candidates[0].weighted_votes), (2, 5));
    assert_eq!(president.blank_votes, 1);
    assert_eq!((president.total_votes, president.weighted_total), (3, 7));

    let treasurer = &outcome.positions[1];
    assert_eq!((treasurer.null_votes, treasurer.total_votes), (1, 1));
    assert_eq!(treasurer.candidates[0].votes, 0);
}

#[test]
fn test_zero_tally_lists_inactive_candidates_too() {
    let definition = ElectionBuilder::default().inactive_candidate(CANDIDATE_B).build().definition();
    let zero = zero_tally(&definition);
    assert_eq!(zero[0].candidates.len(), 2);
    assert!(zero.iter().all(|p| p.total_votes == 0 && p.weighted_total == 0));
}
