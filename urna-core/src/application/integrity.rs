use crate::application::ElectionCore;
use crate::domain::ballot::signature_matches;
use crate::domain::election::compute_seal_hash;
use crate::domain::report::VoteChecks;
use crate::domain::{Actor, AuditEvent, IntegrityReport};
use crate::foundation::{ElectionId, UrnaError};
use log::{info, warn};

impl ElectionCore {
    /// Recomputes the seal hash and checks it against the stored and archived values, then
    /// checks every committed vote's seal binding and signature. Nothing is repaired.
    pub fn verify_integrity(&self, election_id: ElectionId) -> Result<IntegrityReport, UrnaError> {
        let definition = self.load_ballot(election_id)?;
        if !definition.election.is_sealed {
            return Err(UrnaError::ElectionNotSealed { election_id: election_id.value() });
        }
        let stored = definition.election.seal_hash;
        let computed = compute_seal_hash(&definition);
        let archived = self.store.get_seal_record(election_id)?.map(|record| record.seal_hash);

        let mut checks = VoteChecks::default();
        for vote in self.store.list_votes(election_id)? {
            checks.checked += 1;
            if !stored.map(|hash| hash.ct_eq(&vote.seal_hash_at_cast)).unwrap_or(false) {
                checks.foreign_seal += 1;
            }
            if !signature_matches(&vote) {
                checks.invalid_signature += 1;
            }
        }

        let report = IntegrityReport::assess(election_id, stored, computed, archived, checks, self.clock.now());
        if report.integrity_valid {
            info!("integrity verified election_id={} votes_checked={}", election_id, report.votes_checked);
        } else {
            warn!(
                "integrity check failed election_id={} matches_stored={} matches_archive={} foreign_seal={} invalid_signature={} computed={}",
                election_id,
                report.matches_stored,
                report.matches_archive,
                report.votes_with_foreign_seal,
                report.votes_with_invalid_signature,
                computed
            );
        }
        self.record_audit(
            Actor::System,
            election_id,
            AuditEvent::IntegrityVerified {
                integrity_valid: report.integrity_valid,
                stored_hash: stored.map(|hash| hash.to_hex()),
                computed_hash: computed.to_hex(),
                votes_with_foreign_seal: report.votes_with_foreign_seal,
                votes_with_invalid_signature: report.votes_with_invalid_signature,
            },
        );
        Ok(report)
    }
}
