use crate::application::ElectionCore;
use crate::domain::election::{compute_seal_hash, seal_blockers, status_label, BallotDefinition, SealRecord, SealResult, SealStatus};
use crate::domain::{Actor, AuditEvent, ElectionStatus};
use crate::foundation::{AdminId, ElectionId, UrnaError};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealValidation {
    pub valid: bool,
}

impl ElectionCore {
    /// Freezes the ballot and records its seal hash. Exactly one of any concurrent callers wins;
    /// the rest get `ElectionAlreadySealed`.
    pub fn seal_election(&self, election_id: ElectionId, admin_id: AdminId) -> Result<SealResult, UrnaError> {
        let definition = self.load_ballot(election_id)?;
        self.authorize(admin_id, &definition.election)?;
        ensure_sealable(&definition)?;

        let seal_hash = compute_seal_hash(&definition);
        let record = SealRecord {
            election_id,
            seal_hash,
            sealed_at: self.clock.now(),
            sealed_by: admin_id,
            position_ids: definition.position_ids(),
            revision: definition.election.revision,
        };
        debug!("computed seal hash election_id={} revision={} seal_hash={}", election_id, record.revision, seal_hash);

        let sealed = self.store.record_seal(&record).map_err(|err| {
            warn!("seal rejected election_id={} admin_id={} error={}", election_id, admin_id, err);
            err
        })?;
        info!("election sealed election_id={} admin_id={} seal_hash={}", election_id, admin_id, seal_hash);
        self.record_audit(
            Actor::Admin(admin_id),
            election_id,
            AuditEvent::ElectionSealed {
                seal_hash: seal_hash.to_hex(),
                position_count: record.position_ids.len(),
                revision: record.revision,
            },
        );
        Ok(SealResult { seal_hash, sealed_at: record.sealed_at, sealed_by: sealed.sealed_by.unwrap_or(admin_id) })
    }

    pub fn get_seal_status(&self, election_id: ElectionId) -> Result<SealStatus, UrnaError> {
        let definition = self.load_ballot(election_id)?;
        let can_be_sealed = seal_blockers(&definition).is_empty();
        let frozen_position_ids = self.store.get_seal_record(election_id)?.map(|record| record.position_ids).unwrap_or_default();
        let election = &definition.election;
        Ok(SealStatus {
            election_id,
            is_sealed: election.is_sealed,
            seal_hash: election.seal_hash,
            sealed_at: election.sealed_at,
            sealed_by: election.sealed_by,
            can_be_sealed,
            status: election.status,
            status_label: status_label(election, can_be_sealed),
            frozen_position_ids,
        })
    }

    /// Recomputes the seal hash from stored data. A mismatch is reported, never corrected.
    pub fn validate_seal(&self, election_id: ElectionId) -> Result<SealValidation, UrnaError> {
        let definition = self.load_ballot(election_id)?;
        let computed = compute_seal_hash(&definition);
        let stored = definition.election.seal_hash;
        let valid = definition.election.is_sealed && stored.map(|hash| hash.ct_eq(&computed)).unwrap_or(false);
        if definition.election.is_sealed && !valid {
            warn!(
                "seal hash mismatch election_id={} stored={} computed={}",
                election_id,
                stored.map(|hash| hash.to_hex()).unwrap_or_else(|| "-".to_string()),
                computed
            );
        }
        self.record_audit(
            Actor::System,
            election_id,
            AuditEvent::SealValidated { valid, stored_hash: stored.map(|hash| hash.to_hex()), computed_hash: computed.to_hex() },
        );
        Ok(SealValidation { valid })
    }
}

fn ensure_sealable(definition: &BallotDefinition) -> Result<(), UrnaError> {
    let election = &definition.election;
    if election.is_sealed {
        return Err(UrnaError::ElectionAlreadySealed { election_id: election.id.value() });
    }
    if election.status != ElectionStatus::Active {
        return Err(UrnaError::InvalidStateTransition { from: election.status.to_string(), to: ElectionStatus::Sealed.to_string() });
    }
    election.window.validate()?;
    let ordered = definition.ordered();
    if ordered.is_empty() {
        return Err(UrnaError::EmptyBallot { election_id: election.id.value(), reason: "no positions".to_string() });
    }
    if let Some((position, _)) = ordered.iter().find(|(_, candidates)| !candidates.iter().any(|c| c.active)) {
        return Err(UrnaError::EmptyBallot {
            election_id: election.id.value(),
            reason: format!("position {} has no active candidates", position.id),
        });
    }
    Ok(())
}
