use crate::application::ElectionCore;
use crate::domain::election::{ensure_direct_transition, BallotEdit};
use crate::domain::{Actor, AuditEvent, Election, ElectionStatus};
use crate::foundation::{AdminId, ElectionId, UrnaError};
use log::{debug, info, warn};

impl ElectionCore {
    /// Moves an election to `target`. `sealed` is only reachable through [`ElectionCore::seal_election`].
    pub fn transition(&self, election_id: ElectionId, target: ElectionStatus, admin_id: AdminId) -> Result<Election, UrnaError> {
        let election = self.load_election(election_id)?;
        self.authorize(admin_id, &election)?;
        ensure_direct_transition(election.status, target)?;
        if election.status == target {
            debug!("status transition is a no-op election_id={} status={}", election_id, target);
            return Ok(election);
        }
        let updated = self.store.compare_and_set_status(election_id, election.status, target, self.clock.now())?;
        info!("election status changed election_id={} from={} to={}", election_id, election.status, updated.status);
        self.record_audit(
            Actor::Admin(admin_id),
            election_id,
            AuditEvent::StatusChanged { from: election.status.to_string(), to: updated.status.to_string() },
        );
        Ok(updated)
    }

    /// Applies a ballot-definition edit; rejected with `ElectionImmutable` once sealed.
    pub fn apply_ballot_edit(&self, election_id: ElectionId, edit: &BallotEdit, admin_id: AdminId) -> Result<Election, UrnaError> {
        let election = self.load_election(election_id)?;
        self.authorize(admin_id, &election)?;
        match self.store.apply_ballot_edit(election_id, edit, self.clock.now()) {
            Ok(updated) => {
                info!("ballot edit applied election_id={} field={} revision={}", election_id, edit.field(), updated.revision);
                Ok(updated)
            }
            Err(err) => {
                warn!("ballot edit rejected election_id={} field={} error={}", election_id, edit.field(), err);
                if matches!(err, UrnaError::ElectionImmutable { .. }) {
                    self.record_audit(
                        Actor::Admin(admin_id),
                        election_id,
                        AuditEvent::BallotEditRejected { field: edit.field().to_string(), reason: err.to_string() },
                    );
                }
                Err(err)
            }
        }
    }
}
