use crate::domain::crypto::report_content_hash;
use crate::domain::report::PositionTally;
use crate::foundation::{AdminId, ElectionId, ReportHash, ReportId, SealHash, UrnaError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Zero,
    Counting,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Zero => f.write_str("zero"),
            ReportKind::Counting => f.write_str("counting"),
        }
    }
}

/// Point-in-time aggregation with its own content hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub report_id: ReportId,
    pub election_id: ElectionId,
    pub kind: ReportKind,
    pub election_title: String,
    pub seal_hash: Option<SealHash>,
    pub generated_at: DateTime<Utc>,
    pub generated_by: AdminId,
    pub origin_address: Option<String>,
    pub positions: Vec<PositionTally>,
    pub total_ballots: u64,
    pub skipped_votes: u64,
    pub content_hash: ReportHash,
}

pub type ZeroReport = ReportSnapshot;
pub type CountingReport = ReportSnapshot;

#[derive(Serialize)]
struct CanonicalBody<'a> {
    report_id: &'a ReportId,
    election_id: ElectionId,
    kind: ReportKind,
    election_title: &'a str,
    seal_hash: &'a Option<SealHash>,
    generated_at: &'a DateTime<Utc>,
    generated_by: AdminId,
    origin_address: &'a Option<String>,
    positions: &'a [PositionTally],
    total_ballots: u64,
    skipped_votes: u64,
}

impl ReportSnapshot {
    /// Canonical JSON of every field except the content hash itself.
    pub fn canonical_body(&self) -> Result<Vec<u8>, UrnaError> {
        let body = CanonicalBody {
            report_id: &self.report_id,
            election_id: self.election_id,
            kind: self.kind,
            election_title: &self.election_title,
            seal_hash: &self.seal_hash,
            generated_at: &self.generated_at,
            generated_by: self.generated_by,
            origin_address: &self.origin_address,
            positions: &self.positions,
            total_ballots: self.total_ballots,
            skipped_votes: self.skipped_votes,
        };
        Ok(serde_json::to_vec(&body)?)
    }

    pub fn compute_content_hash(&self) -> Result<ReportHash, UrnaError> {
        Ok(report_content_hash(&self.canonical_body()?))
    }

    pub fn seal_content_hash(mut self) -> Result<Self, UrnaError> {
        self.content_hash = self.compute_content_hash()?;
        Ok(self)
    }

    pub fn verify_content_hash(&self) -> Result<bool, UrnaError> {
        Ok(self.compute_content_hash()?.ct_eq(&self.content_hash))
    }
}
