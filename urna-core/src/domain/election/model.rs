use crate::foundation::{AdminId, CandidateId, CompanyId, ElectionId, PositionId, SealHash, UrnaError, VoterId};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectionStatus {
    Draft,
    Active,
    Sealed,
    Completed,
    Cancelled,
}

impl ElectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElectionStatus::Draft => "draft",
            ElectionStatus::Active => "active",
            ElectionStatus::Sealed => "sealed",
            ElectionStatus::Completed => "completed",
            ElectionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ElectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an instant falls relative to the voting window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowPosition {
    NotStarted,
    Open,
    Ended,
}

/// Voting window expressed as local wall-clock times in the election's timezone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingWindow {
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    /// IANA timezone name, e.g. `America/Sao_Paulo`.
    pub timezone: String,
}

impl VotingWindow {
    pub fn new(starts_at: NaiveDateTime, ends_at: NaiveDateTime, timezone: impl Into<String>) -> Self {
        Self { starts_at, ends_at, timezone: timezone.into() }
    }

    pub fn tz(&self) -> Result<Tz, UrnaError> {
        self.timezone.trim().parse::<Tz>().map_err(|err| UrnaError::InvalidTimezone(format!("{}: {}", self.timezone, err)))
    }

    pub fn start_instant(&self) -> Result<DateTime<Utc>, UrnaError> {
        resolve_local(&self.tz()?, &self.starts_at)
    }

    pub fn end_instant(&self) -> Result<DateTime<Utc>, UrnaError> {
        resolve_local(&self.tz()?, &self.ends_at)
    }

    /// Inclusive on both ends: `[start, end]`.
    pub fn position_of(&self, now: DateTime<Utc>) -> Result<WindowPosition, UrnaError> {
        let start = self.start_instant()?;
        let end = self.end_instant()?;
        if now < start {
            return Ok(WindowPosition::NotStarted);
        }
        if now > end {
            return Ok(WindowPosition::Ended);
        }
        Ok(WindowPosition::Open)
    }

    pub fn validate(&self) -> Result<(), UrnaError> {
        self.tz()?;
        if self.ends_at <= self.starts_at {
            return Err(UrnaError::Message(format!("voting window ends ({}) before it starts ({})", self.ends_at, self.starts_at)));
        }
        Ok(())
    }
}

/// Maps a local wall-clock time onto the UTC timeline.
///
/// Ambiguous times (DST fold) take the earlier instant; times inside a DST gap are
/// moved forward by the gap so the window never silently disappears.
fn resolve_local(tz: &Tz, local: &NaiveDateTime) -> Result<DateTime<Utc>, UrnaError> {
    if let Some(resolved) = tz.from_local_datetime(local).earliest() {
        return Ok(resolved.with_timezone(&Utc));
    }
    let shifted = *local + Duration::hours(1);
    tz.from_local_datetime(&shifted)
        .earliest()
        .map(|resolved| resolved.with_timezone(&Utc))
        .ok_or_else(|| UrnaError::InvalidTimezone(format!("local time {} does not exist in {}", local, tz.name())))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    pub id: ElectionId,
    pub company_id: CompanyId,
    pub title: String,
    pub window: VotingWindow,
    pub status: ElectionStatus,
    pub is_sealed: bool,
    pub seal_hash: Option<SealHash>,
    pub sealed_at: Option<DateTime<Utc>>,
    pub sealed_by: Option<AdminId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every ballot-definition edit; sealing is conditional on it.
    pub revision: u64,
}

impl Election {
    pub fn draft(id: ElectionId, company_id: CompanyId, title: impl Into<String>, window: VotingWindow, now: DateTime<Utc>) -> Self {
        Self {
            id,
            company_id,
            title: title.into(),
            window,
            status: ElectionStatus::Draft,
            is_sealed: false,
            seal_hash: None,
            sealed_at: None,
            sealed_by: None,
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, ElectionStatus::Completed | ElectionStatus::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub election_id: ElectionId,
    pub title: String,
    pub max_selections: u32,
    pub display_order: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub position_id: PositionId,
    pub name: String,
    pub number: u32,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub id: VoterId,
    pub name: String,
    pub national_id: String,
    pub credential_hash: String,
    pub vote_weight: u32,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Administrator {
    pub id: AdminId,
    pub company_id: CompanyId,
    pub name: String,
    pub active: bool,
    pub super_admin: bool,
}

impl Administrator {
    pub fn may_manage(&self, election: &Election) -> bool {
        self.active && (self.super_admin || self.company_id == election.company_id)
    }
}
