use crate::domain::ballot::VoteKind;
use crate::domain::election::BallotDefinition;
use crate::foundation::{CandidateId, PositionId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTally {
    pub candidate_id: CandidateId,
    pub name: String,
    pub number: u32,
    pub votes: u64,
    pub weighted_votes: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTally {
    pub position_id: PositionId,
    pub title: String,
    pub candidates: Vec<CandidateTally>,
    pub blank_votes: u64,
    pub null_votes: u64,
    pub total_votes: u64,
    pub weighted_total: u64,
}

/// A committed vote after its payload was decrypted and checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedVote {
    pub position_id: PositionId,
    pub kind: VoteKind,
    pub candidate_id: Option<CandidateId>,
    pub weight: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TallyOutcome {
    pub positions: Vec<PositionTally>,
    /// Votes that could not be attributed to a position/candidate of this ballot.
    pub unattributed: u64,
}

/// Every position and candidate of the ballot with all counters at zero.
pub fn zero_tally(definition: &BallotDefinition) -> Vec<PositionTally> {
    definition
        .ordered()
        .into_iter()
        .map(|(position, candidates)| PositionTally {
            position_id: position.id,
            title: position.title.clone(),
            candidates: candidates
                .into_iter()
                .map(|c| CandidateTally { candidate_id: c.id, name: c.name.clone(), number: c.number, votes: 0, weighted_votes: 0 })
                .collect(),
            blank_votes: 0,
            null_votes: 0,
            total_votes: 0,
            weighted_total: 0,
        })
        .collect()
}

/// Blank and null come from the vote kind; candidates from the decrypted selection.
pub fn tally_votes(definition: &BallotDefinition, votes: &[DecodedVote]) -> TallyOutcome {
    let mut positions = zero_tally(definition);
    let mut unattributed = 0u64;
    for vote in votes {
        let Some(position) = positions.iter_mut().find(|p| p.position_id == vote.position_id) else {
            unattributed += 1;
            continue;
        };
        let weight = u64::from(vote.weight);
        match (vote.kind, vote.candidate_id) {
            (VoteKind::Blank, _) => position.blank_votes += 1,
            (VoteKind::Null, _) => position.null_votes += 1,
            (VoteKind::Candidate, Some(candidate_id)) => match position.candidates.iter_mut().find(|c| c.candidate_id == candidate_id) {
                Some(candidate) => {
                    candidate.votes += 1;
                    candidate.weighted_votes += weight;
                }
                None => {
                    unattributed += 1;
                    continue;
                }
            },
            (VoteKind::Candidate, None) => {
                unattributed += 1;
                continue;
            }
        }
        position.total_votes += 1;
        position.weighted_total += weight;
    }
    TallyOutcome { positions, unattributed }
}
