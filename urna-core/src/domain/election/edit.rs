use crate::domain::election::{ensure_ballot_mutable, BallotDefinition, Candidate, Election, Position, VotingWindow};
use crate::foundation::{CandidateId, PositionId, UrnaError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A change to the ballot-defining projection of an election.
///
/// Applied by the store only while the election is unsealed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BallotEdit {
    UpdateDetails { title: Option<String>, window: Option<VotingWindow> },
    AddPosition(Position),
    UpdatePosition(Position),
    RemovePosition(PositionId),
    AddCandidate(Candidate),
    UpdateCandidate(Candidate),
    RemoveCandidate(CandidateId),
}

/// Row-level writes an edit resolves to; the store applies them in one atomic write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditPlan {
    pub election: Option<Election>,
    pub put_positions: Vec<Position>,
    pub delete_positions: Vec<PositionId>,
    pub put_candidates: Vec<Candidate>,
    pub delete_candidates: Vec<CandidateId>,
}

impl BallotEdit {
    /// Name of the frozen field this edit touches.
    pub fn field(&self) -> &'static str {
        match self {
            BallotEdit::UpdateDetails { title: Some(_), window: None } => "title",
            BallotEdit::UpdateDetails { title: None, window: Some(_) } => "dates",
            BallotEdit::UpdateDetails { .. } => "details",
            BallotEdit::AddPosition(_) | BallotEdit::UpdatePosition(_) | BallotEdit::RemovePosition(_) => "positions",
            BallotEdit::AddCandidate(_) | BallotEdit::UpdateCandidate(_) | BallotEdit::RemoveCandidate(_) => "candidates",
        }
    }

    /// Resolves the edit against the current definition. The returned election has its revision bumped.
    pub fn plan(&self, definition: &BallotDefinition, now: DateTime<Utc>) -> Result<EditPlan, UrnaError> {
        let current = &definition.election;
        ensure_ballot_mutable(current, self.field())?;
        let election_id = current.id.value();
        let mut plan = EditPlan::default();
        let mut election = current.clone();

        match self {
            BallotEdit::UpdateDetails { title, window } => {
                if let Some(title) = title {
                    election.title = title.clone();
                }
                if let Some(window) = window {
                    window.validate()?;
                    election.window = window.clone();
                }
            }
            BallotEdit::AddPosition(position) | BallotEdit::UpdatePosition(position) => {
                if position.election_id != current.id {
                    return Err(UrnaError::PositionNotInElection { position_id: position.id.value(), election_id });
                }
                let exists = definition.position(position.id).is_some();
                if matches!(self, BallotEdit::UpdatePosition(_)) && !exists {
                    return Err(UrnaError::PositionNotFound(position.id.value()));
                }
                plan.put_positions.push(position.clone());
            }
            BallotEdit::RemovePosition(position_id) => {
                if definition.position(*position_id).is_none() {
                    return Err(UrnaError::PositionNotFound(position_id.value()));
                }
                plan.delete_positions.push(*position_id);
                plan.delete_candidates.extend(definition.candidates_for(*position_id).map(|c| c.id));
            }
            BallotEdit::AddCandidate(candidate) | BallotEdit::UpdateCandidate(candidate) => {
                if definition.position(candidate.position_id).is_none() {
                    return Err(UrnaError::PositionNotInElection { position_id: candidate.position_id.value(), election_id });
                }
                let exists = definition.candidates.iter().any(|c| c.id == candidate.id);
                if matches!(self, BallotEdit::UpdateCandidate(_)) && !exists {
                    return Err(UrnaError::CandidateNotFound(candidate.id.value()));
                }
                plan.put_candidates.push(candidate.clone());
            }
            BallotEdit::RemoveCandidate(candidate_id) => {
                if !definition.candidates.iter().any(|c| c.id == *candidate_id) {
                    return Err(UrnaError::CandidateNotFound(candidate_id.value()));
                }
                plan.delete_candidates.push(*candidate_id);
            }
        }

        election.revision = current.revision.saturating_add(1);
        election.updated_at = now;
        plan.election = Some(election);
        Ok(plan)
    }
}
