use crate::domain::election::{Candidate, Election, ElectionStatus, Position};
use crate::foundation::{AdminId, ElectionId, PositionId, SealHash, CANONICAL_LOCAL_FORMAT};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SEAL_DOMAIN_V1: &[u8] = b"urna:seal:v1:";

/// Everything the seal hash covers, as loaded from the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BallotDefinition {
    pub election: Election,
    pub positions: Vec<Position>,
    pub candidates: Vec<Candidate>,
}

impl BallotDefinition {
    /// Positions ordered by id, each with its candidates ordered by id.
    pub fn ordered(&self) -> Vec<(&Position, Vec<&Candidate>)> {
        let mut by_position: BTreeMap<PositionId, Vec<&Candidate>> = BTreeMap::new();
        for candidate in &self.candidates {
            by_position.entry(candidate.position_id).or_default().push(candidate);
        }
        let mut positions: Vec<&Position> = self.positions.iter().filter(|p| p.election_id == self.election.id).collect();
        positions.sort_by_key(|p| p.id);
        positions
            .into_iter()
            .map(|position| {
                let mut candidates = by_position.remove(&position.id).unwrap_or_default();
                candidates.sort_by_key(|c| c.id);
                (position, candidates)
            })
            .collect()
    }

    pub fn position_ids(&self) -> Vec<PositionId> {
        self.ordered().into_iter().map(|(position, _)| position.id).collect()
    }

    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id && p.election_id == self.election.id)
    }

    pub fn candidates_for(&self, position_id: PositionId) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(move |c| c.position_id == position_id)
    }
}

pub fn compute_seal_hash(definition: &BallotDefinition) -> SealHash {
    let mut buf = Vec::with_capacity(256);
    buf.extend_from_slice(SEAL_DOMAIN_V1);
    encode_ballot_v1(definition, &mut buf);
    SealHash::new(*blake3::hash(&buf).as_bytes())
}

fn encode_ballot_v1(definition: &BallotDefinition, out: &mut Vec<u8>) {
    let election = &definition.election;
    out.extend_from_slice(&election.id.value().to_le_bytes());
    put_str(out, &election.title);
    put_str(out, &election.window.starts_at.format(CANONICAL_LOCAL_FORMAT).to_string());
    put_str(out, &election.window.ends_at.format(CANONICAL_LOCAL_FORMAT).to_string());
    put_str(out, election.window.timezone.trim());
    out.extend_from_slice(&election.company_id.value().to_le_bytes());
    put_str(out, &election.created_at.to_rfc3339_opts(SecondsFormat::Secs, true));

    let ordered = definition.ordered();
    out.extend_from_slice(&(ordered.len() as u32).to_le_bytes());
    for (position, candidates) in ordered {
        out.extend_from_slice(&position.id.value().to_le_bytes());
        put_str(out, &position.title);
        out.extend_from_slice(&position.max_selections.to_le_bytes());
        out.extend_from_slice(&(candidates.len() as u32).to_le_bytes());
        for candidate in candidates {
            out.extend_from_slice(&candidate.id.value().to_le_bytes());
            put_str(out, &candidate.name);
            out.extend_from_slice(&candidate.number.to_le_bytes());
        }
    }
}

fn put_str(out: &mut Vec<u8>, value: &str) {
    out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    out.extend_from_slice(value.as_bytes());
}

/// Archived copy of a successful seal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealRecord {
    pub election_id: ElectionId,
    pub seal_hash: SealHash,
    pub sealed_at: DateTime<Utc>,
    pub sealed_by: AdminId,
    pub position_ids: Vec<PositionId>,
    /// Election revision the hash was computed against.
    pub revision: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealResult {
    pub seal_hash: SealHash,
    pub sealed_at: DateTime<Utc>,
    pub sealed_by: AdminId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealStatus {
    pub election_id: ElectionId,
    pub is_sealed: bool,
    pub seal_hash: Option<SealHash>,
    pub sealed_at: Option<DateTime<Utc>>,
    pub sealed_by: Option<AdminId>,
    pub can_be_sealed: bool,
    pub status: ElectionStatus,
    pub status_label: String,
    pub frozen_position_ids: Vec<PositionId>,
}

/// Reasons the election cannot be sealed right now; empty when sealing may proceed.
pub fn seal_blockers(definition: &BallotDefinition) -> Vec<String> {
    let election = &definition.election;
    let mut blockers = Vec::new();
    if election.is_sealed {
        blockers.push("election is already sealed".to_string());
        return blockers;
    }
    if election.status != ElectionStatus::Active {
        blockers.push(format!("election status is {} (must be active)", election.status));
    }
    if let Err(err) = election.window.validate() {
        blockers.push(err.to_string());
    }
    let ordered = definition.ordered();
    if ordered.is_empty() {
        blockers.push("election has no positions".to_string());
    }
    for (position, candidates) in &ordered {
        if !candidates.iter().any(|c| c.active) {
            blockers.push(format!("position {} has no active candidates", position.id));
        }
    }
    blockers
}

pub fn status_label(election: &Election, can_be_sealed: bool) -> String {
    match (election.is_sealed, election.status) {
        (true, ElectionStatus::Completed) => "Sealed, voting completed".to_string(),
        (true, _) => "Sealed, ballot frozen".to_string(),
        (false, ElectionStatus::Cancelled) => "Cancelled".to_string(),
        (false, _) if can_be_sealed => "Ready to seal".to_string(),
        (false, _) => "Not ready to seal".to_string(),
    }
}
