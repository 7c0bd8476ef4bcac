use crate::fixtures::*;
use urna_core::domain::election::{compute_seal_hash, BallotDefinition};
use urna_core::domain::crypto::{canonical_instant, vote_hash};
use urna_core::foundation::VoteTransactionId;

fn definition() -> BallotDefinition {
    ElectionBuilder::default().build().definition()
}

#[test]
fn test_seal_hash_when_same_definition_then_is_stable() {
    assert_eq!(compute_seal_hash(&definition()), compute_seal_hash(&definition()));
}

#[test]
fn test_seal_hash_when_rows_are_reordered_then_is_unchanged() {
    let base = definition();
    let mut shuffled = base.clone();
    shuffled.positions.reverse();
    shuffled.candidates.reverse();
    assert_eq!(compute_seal_hash(&base), compute_seal_hash(&shuffled));
}

#[test]
fn test_seal_hash_when_ballot_content_changes_then_changes() {
    let base = definition();
    let expected = compute_seal_hash(&base);

    let mut renamed = base.clone();
    renamed.candidates[0].name.push_str(" Filho");
    assert_ne!(compute_seal_hash(&renamed), expected, "candidate name");

    let mut renumbered = base.clone();
    renumbered.candidates[0].number += 1;
    assert_ne!(compute_seal_hash(&renumbered), expected, "candidate number");

    let mut retitled = base.clone();
    retitled.positions[0].title = "Chair".to_string();
    assert_ne!(compute_seal_hash(&retitled), expected, "position title");

    let mut election_title = base.clone();
    election_title.election.title = "Board election 2025".to_string();
    assert_ne!(compute_seal_hash(&election_title), expected, "election title");

    let mut moved = base.clone();
    moved.election.window.ends_at = local(2024, 5, 10, 18, 0);
    assert_ne!(compute_seal_hash(&moved), expected, "window end");

    let mut dropped = base;
    dropped.candidates.pop();
    assert_ne!(compute_seal_hash(&dropped), expected, "candidate removed");
}

#[test]
fn test_seal_hash_when_presentation_fields_change_then_is_unchanged() {
    let base = definition();
    let mut reordered = base.clone();
    reordered.positions[0].display_order = 99;
    reordered.candidates[1].active = false;
    assert_eq!(compute_seal_hash(&base), compute_seal_hash(&reordered));
}

#[test]
fn test_seal_hash_ignores_positions_of_other_elections() {
    let base = definition();
    let mut polluted = base.clone();
    let mut stray = polluted.positions[0].clone();
    stray.id = urna_core::foundation::PositionId::new(999);
    stray.election_id = urna_core::foundation::ElectionId::new(2);
    polluted.positions.push(stray);
    assert_eq!(compute_seal_hash(&base), compute_seal_hash(&polluted));
}

#[test]
fn test_vote_hash_when_field_changes_then_changes() {
    let tx = VoteTransactionId::new("tx-1");
    let base = vote_hash(&tx, VOTER_1, CANDIDATE_A.value(), &voting_open_at());
    assert_ne!(base, vote_hash(&VoteTransactionId::new("tx-2"), VOTER_1, CANDIDATE_A.value(), &voting_open_at()));
    assert_ne!(base, vote_hash(&tx, VOTER_2, CANDIDATE_A.value(), &voting_open_at()));
    assert_ne!(base, vote_hash(&tx, VOTER_1, 0, &voting_open_at()));
    assert_ne!(base, vote_hash(&tx, VOTER_1, CANDIDATE_A.value(), &after_window()));
}

#[test]
fn test_canonical_instant_is_utc_rfc3339() {
    let rendered = canonical_instant(&voting_open_at());
    assert!(rendered.starts_with("2024-05-10T12:00:00"));
    assert!(rendered.ends_with('Z'));
}
