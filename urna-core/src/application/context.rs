use crate::domain::{Actor, Administrator, AuditEntry, AuditEvent, BallotDefinition, Election, VoteCrypto};
use crate::foundation::{AdminId, Clock, ElectionId, SystemClock, UrnaError, DEFAULT_MAX_JUSTIFICATION_LEN, DEFAULT_RECEIPT_TOKEN_BYTES};
use crate::infrastructure::audit::{audit_logger_from_config, AuditLogger};
use crate::infrastructure::config::{AppConfig, StorageBackend, VotingConfig};
use crate::infrastructure::storage::{ElectionStore, RocksStorage};
use log::{info, warn};
use std::sync::Arc;

/// Tunables for casting and receipts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VotingSettings {
    pub receipt_token_bytes: usize,
    pub max_justification_len: usize,
}

impl Default for VotingSettings {
    fn default() -> Self {
        Self { receipt_token_bytes: DEFAULT_RECEIPT_TOKEN_BYTES, max_justification_len: DEFAULT_MAX_JUSTIFICATION_LEN }
    }
}

impl From<&VotingConfig> for VotingSettings {
    fn from(config: &VotingConfig) -> Self {
        Self { receipt_token_bytes: config.receipt_token_bytes, max_justification_len: config.max_justification_len }
    }
}

/// Entry point for every election operation exposed to the surrounding application.
///
/// Cheap to clone; every collaborator is shared behind an `Arc`.
#[derive(Clone)]
pub struct ElectionCore {
    pub(crate) store: Arc<dyn ElectionStore>,
    pub(crate) crypto: Arc<VoteCrypto>,
    pub(crate) audit: Arc<dyn AuditLogger>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) settings: VotingSettings,
}

impl ElectionCore {
    pub fn new(
        store: Arc<dyn ElectionStore>,
        crypto: Arc<VoteCrypto>,
        audit: Arc<dyn AuditLogger>,
        clock: Arc<dyn Clock>,
        settings: VotingSettings,
    ) -> Self {
        Self { store, crypto, audit, clock, settings }
    }

    /// Wires storage, keys and audit sinks from a validated configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, UrnaError> {
        config.validate().map_err(|errors| UrnaError::ConfigError(format!("validation failed: {:?}", errors)))?;
        let store: Arc<dyn ElectionStore> = match config.storage.backend {
            StorageBackend::Rocks => {
                Arc::new(RocksStorage::open_in_dir_with_options(&config.storage.data_dir, config.storage.allow_schema_wipe)?)
            }
            #[cfg(any(test, feature = "test-utils"))]
            StorageBackend::Memory => Arc::new(crate::infrastructure::storage::MemoryStorage::new()),
            #[cfg(not(any(test, feature = "test-utils")))]
            StorageBackend::Memory => {
                return Err(UrnaError::ConfigError("storage.backend=memory is only available with the test-utils feature".to_string()))
            }
        };
        store.health_check()?;
        let crypto = Arc::new(VoteCrypto::from_hex(&config.crypto.vote_secret_hex)?);
        let audit = audit_logger_from_config(&config.audit)?;
        info!(
            "election core ready backend={} data_dir={} receipt_token_bytes={}",
            config.storage.backend, config.storage.data_dir, config.voting.receipt_token_bytes
        );
        Ok(Self::new(store, crypto, audit, Arc::new(SystemClock), VotingSettings::from(&config.voting)))
    }

    pub fn store(&self) -> &Arc<dyn ElectionStore> {
        &self.store
    }

    pub fn settings(&self) -> VotingSettings {
        self.settings
    }

    pub(crate) fn load_election(&self, election_id: ElectionId) -> Result<Election, UrnaError> {
        self.store.get_election(election_id)?.ok_or(UrnaError::ElectionNotFound(election_id.value()))
    }

    pub(crate) fn load_ballot(&self, election_id: ElectionId) -> Result<BallotDefinition, UrnaError> {
        self.store.load_ballot(election_id)?.ok_or(UrnaError::ElectionNotFound(election_id.value()))
    }

    /// An administrator may act on an election if active and either super-admin or of the same company.
    pub(crate) fn authorize(&self, admin_id: AdminId, election: &Election) -> Result<Administrator, UrnaError> {
        let admin = self.store.get_administrator(admin_id)?.ok_or(UrnaError::AdministratorNotFound(admin_id.value()))?;
        if !admin.may_manage(election) {
            warn!("administrator not allowed on election admin_id={} election_id={}", admin_id, election.id);
            return Err(UrnaError::Unauthorized { admin_id: admin_id.value(), election_id: election.id.value() });
        }
        Ok(admin)
    }

    pub(crate) fn record_audit(&self, actor: Actor, election_id: ElectionId, detail: AuditEvent) {
        self.audit.record(AuditEntry::election(actor, election_id, detail));
    }
}
