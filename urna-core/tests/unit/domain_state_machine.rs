use crate::fixtures::*;
use urna_core::domain::election::{ensure_ballot_mutable, ensure_direct_transition, validate_transition, BallotEdit};
use urna_core::domain::ElectionStatus::{self, Active, Cancelled, Completed, Draft, Sealed};
use urna_core::foundation::UrnaError;

const ALL: [ElectionStatus; 5] = [Draft, Active, Sealed, Completed, Cancelled];

#[test]
fn test_transition_table_is_exact() {
    let allowed = [(Draft, Active), (Active, Sealed), (Sealed, Completed), (Draft, Cancelled), (Active, Cancelled)];
    for from in ALL {
        for to in ALL {
            let result = validate_transition(from, to);
            let expected = from == to || allowed.contains(&(from, to));
            assert_eq!(result.valid, expected, "{} -> {}", from, to);
        }
    }
}

#[test]
fn test_same_status_is_a_no_op() {
    let result = validate_transition(Sealed, Sealed);
    assert!(result.valid);
    assert_eq!(result.transition_reason.as_deref(), Some("no_op"));
}

#[test]
fn test_sealed_status_is_only_reached_through_the_seal_flow() {
    let err = ensure_direct_transition(Active, Sealed).unwrap_err();
    assert!(matches!(err, UrnaError::InvalidStateTransition { ref from, ref to } if from == "active" && to == "sealed"));
    assert!(ensure_direct_transition(Sealed, Completed).is_ok());
    assert!(ensure_direct_transition(Sealed, Cancelled).is_err());
}

#[test]
fn test_terminal_states_have_no_exit() {
    for from in [Completed, Cancelled] {
        for to in ALL.into_iter().filter(|to| *to != from) {
            assert!(!validate_transition(from, to).valid, "{} -> {}", from, to);
        }
    }
}

#[test]
fn test_sealed_election_freezes_every_ballot_edit() {
    let fixture = ElectionBuilder::default().build();
    let mut definition = fixture.definition();
    definition.election.is_sealed = true;

    let edits = [
        BallotEdit::UpdateDetails { title: Some("Renamed".to_string()), window: None },
        BallotEdit::UpdatePosition(fixture.positions[0].clone()),
        BallotEdit::RemovePosition(POSITION_2),
        BallotEdit::AddCandidate(fixture.candidates[0].clone()),
        BallotEdit::RemoveCandidate(CANDIDATE_B),
    ];
    for edit in &edits {
        let err = edit.plan(&definition, voting_open_at()).unwrap_err();
        assert!(matches!(err, UrnaError::ElectionImmutable { ref field, .. } if field == edit.field()), "{:?}", edit);
    }
    assert!(ensure_ballot_mutable(&definition.election, "title").is_err());
}

#[test]
fn test_unsealed_edit_bumps_revision() {
    let definition = ElectionBuilder::default().build().definition();
    let plan = BallotEdit::UpdateDetails { title: Some("Renamed".to_string()), window: None }
        .plan(&definition, voting_open_at())
        .expect("plan");
    let election = plan.election.expect("election row");
    assert_eq!(election.title, "Renamed");
    assert_eq!(election.revision, definition.election.revision + 1);
}
