use crate::domain::ballot::{Choice, Selection};
use crate::domain::election::{BallotDefinition, Candidate, Position};
use crate::foundation::UrnaError;
use std::collections::HashSet;

/// A selection checked against the ballot definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSelection {
    pub position: Position,
    pub choice: Choice,
    pub candidate: Option<Candidate>,
}

/// Checks ballot structure first, then candidate choices.
///
/// Multi-position elections require every position exactly once; a single-position
/// election takes exactly one selection.
pub fn validate_ballot(definition: &BallotDefinition, selections: &[Selection]) -> Result<Vec<ResolvedSelection>, UrnaError> {
    let election_id = definition.election.id;
    let expected = definition.position_ids().len();

    let mut seen = HashSet::with_capacity(selections.len());
    let mut positions = Vec::with_capacity(selections.len());
    for selection in selections {
        let position = definition.position(selection.position_id).ok_or(UrnaError::PositionNotInElection {
            position_id: selection.position_id.value(),
            election_id: election_id.value(),
        })?;
        if !seen.insert(selection.position_id) {
            return Err(UrnaError::DuplicatePosition { position_id: selection.position_id.value() });
        }
        positions.push(position);
    }
    if selections.is_empty() || (expected > 1 && selections.len() != expected) {
        return Err(UrnaError::IncompletePositions { expected, provided: selections.len() });
    }

    selections
        .iter()
        .zip(positions)
        .map(|(selection, position)| {
            let candidate = match selection.choice {
                Choice::Candidate(candidate_id) => Some(resolve_candidate(definition, position, candidate_id)?),
                Choice::Blank | Choice::Null => None,
            };
            Ok(ResolvedSelection { position: position.clone(), choice: selection.choice, candidate })
        })
        .collect()
}

fn resolve_candidate(
    definition: &BallotDefinition,
    position: &Position,
    candidate_id: crate::foundation::CandidateId,
) -> Result<Candidate, UrnaError> {
    let candidate = definition
        .candidates
        .iter()
        .find(|c| c.id == candidate_id)
        .ok_or_else(|| UrnaError::invalid_candidate(candidate_id.value(), position.id.value(), "unknown candidate"))?;
    if candidate.position_id != position.id {
        return Err(UrnaError::invalid_candidate(candidate_id.value(), position.id.value(), "candidate belongs to another position"));
    }
    if !candidate.active {
        return Err(UrnaError::invalid_candidate(candidate_id.value(), position.id.value(), "candidate is inactive"));
    }
    Ok(candidate.clone())
}

pub fn validate_justification(text: Option<&str>, max_len: usize) -> Result<(), UrnaError> {
    match text {
        Some(text) if text.len() > max_len => Err(UrnaError::JustificationTooLong { len: text.len(), max: max_len }),
        _ => Ok(()),
    }
}
