use crate::foundation::{ElectionId, SealHash, UrnaError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of recomputing a sealed election's hash and checking its ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub election_id: ElectionId,
    pub integrity_valid: bool,
    pub stored_seal_hash: Option<SealHash>,
    pub computed_seal_hash: SealHash,
    pub archived_seal_hash: Option<SealHash>,
    pub matches_stored: bool,
    pub matches_archive: bool,
    pub votes_checked: u64,
    pub votes_with_foreign_seal: u64,
    pub votes_with_invalid_signature: u64,
    pub verified_at: DateTime<Utc>,
}

impl IntegrityReport {
    pub fn assess(
        election_id: ElectionId,
        stored: Option<SealHash>,
        computed: SealHash,
        archived: Option<SealHash>,
        vote_checks: VoteChecks,
        verified_at: DateTime<Utc>,
    ) -> Self {
        let matches_stored = stored.map(|hash| hash.ct_eq(&computed)).unwrap_or(false);
        // A missing archive is reported but only a disagreeing archive fails the check.
        let matches_archive = archived.map(|hash| hash.ct_eq(&computed)).unwrap_or(false);
        let archive_ok = archived.is_none() || matches_archive;
        Self {
            election_id,
            integrity_valid: matches_stored
                && archive_ok
                && vote_checks.foreign_seal == 0
                && vote_checks.invalid_signature == 0,
            stored_seal_hash: stored,
            computed_seal_hash: computed,
            archived_seal_hash: archived,
            matches_stored,
            matches_archive,
            votes_checked: vote_checks.checked,
            votes_with_foreign_seal: vote_checks.foreign_seal,
            votes_with_invalid_signature: vote_checks.invalid_signature,
            verified_at,
        }
    }

    /// Turns a failed check into `IntegrityMismatch` for callers that treat it as an error.
    pub fn ensure_intact(&self) -> Result<(), UrnaError> {
        if self.integrity_valid {
            return Ok(());
        }
        Err(UrnaError::IntegrityMismatch {
            election_id: self.election_id.value(),
            stored: self.stored_seal_hash.map(|hash| hash.to_hex()).unwrap_or_else(|| "none".to_string()),
            computed: self.computed_seal_hash.to_hex(),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoteChecks {
    pub checked: u64,
    pub foreign_seal: u64,
    pub invalid_signature: u64,
}
