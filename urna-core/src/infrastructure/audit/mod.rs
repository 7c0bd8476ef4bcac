use crate::foundation::UrnaError;
use log::{debug, info, warn};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub use crate::domain::audit::{Actor, AuditEntry, AuditEvent};

/// Sink for audit entries. Implementations must not fail the caller.
pub trait AuditLogger: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

const SHORT_ID_DISPLAY_LENGTH: usize = 16;

pub struct StructuredAuditLogger;

impl AuditLogger for StructuredAuditLogger {
    fn record(&self, entry: AuditEntry) {
        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(err) => {
                warn!("audit: failed to serialize audit entry error={}", err);
                "{\"type\":\"serialize_failed\"}".to_string()
            }
        };
        debug!(target: "urna_core::audit::json", "audit entry audit_entry={}", json);
        info!(target: "urna_core::audit::human", "audit summary={}", human_summary(&entry));
    }
}

/// Append-only JSON lines file.
pub struct FileAuditLogger {
    file: Mutex<std::fs::File>,
}

impl FileAuditLogger {
    pub fn new(path: &Path) -> Result<Self, UrnaError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }
}

impl AuditLogger for FileAuditLogger {
    fn record(&self, entry: AuditEntry) {
        use std::io::Write;

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(err) => {
                warn!("audit: failed to serialize audit entry for file logger error={}", err);
                return;
            }
        };
        match self.file.lock() {
            Ok(mut file) => {
                if let Err(err) = writeln!(file, "{}", json) {
                    warn!("audit: failed to write audit entry to file error={}", err);
                    return;
                }
                if let Err(err) = file.flush() {
                    warn!("audit: failed to flush audit entry to file error={}", err);
                }
            }
            Err(err) => {
                warn!("audit: failed to lock audit file mutex error={}", err);
            }
        }
    }
}

#[derive(Default)]
pub struct MultiAuditLogger {
    loggers: Vec<Box<dyn AuditLogger>>,
}

impl MultiAuditLogger {
    pub fn new() -> Self {
        Self { loggers: vec![] }
    }

    pub fn add_logger(&mut self, logger: Box<dyn AuditLogger>) {
        self.loggers.push(logger);
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl AuditLogger for MultiAuditLogger {
    fn record(&self, entry: AuditEntry) {
        for logger in &self.loggers {
            logger.record(entry.clone());
        }
    }
}

pub struct NoopAuditLogger;

impl AuditLogger for NoopAuditLogger {
    fn record(&self, _entry: AuditEntry) {}
}

/// Keeps entries in memory so tests can assert on what was audited.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Clone, Default)]
pub struct MemoryAuditLogger {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MemoryAuditLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().map(|entries| entries.clone()).unwrap_or_default()
    }

    pub fn actions(&self) -> Vec<String> {
        self.entries().into_iter().map(|entry| entry.action).collect()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl AuditLogger for MemoryAuditLogger {
    fn record(&self, entry: AuditEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

/// Builds the sink described by the `[audit]` config section.
pub fn audit_logger_from_config(config: &crate::infrastructure::config::AuditConfig) -> Result<Arc<dyn AuditLogger>, UrnaError> {
    let mut multi = MultiAuditLogger::new();
    if config.structured_log {
        multi.add_logger(Box::new(StructuredAuditLogger));
    }
    if let Some(path) = config.file_path.as_deref() {
        multi.add_logger(Box::new(FileAuditLogger::new(Path::new(path))?));
    }
    if multi.is_empty() {
        return Ok(Arc::new(NoopAuditLogger));
    }
    Ok(Arc::new(multi))
}

fn short_id(value: &str) -> String {
    if value.len() <= SHORT_ID_DISPLAY_LENGTH {
        value.to_string()
    } else {
        format!("{}...", &value[..SHORT_ID_DISPLAY_LENGTH])
    }
}

fn human_summary(entry: &AuditEntry) -> String {
    let subject = format!("{} {}={}", entry.actor_id, entry.resource_type, entry.resource_id);
    match &entry.detail {
        AuditEvent::ElectionSealed { seal_hash, position_count, revision } => format!(
            "AUDIT: election sealed - {} positions={} revision={} (seal: {})",
            subject,
            position_count,
            revision,
            short_id(seal_hash)
        ),
        AuditEvent::SealValidated { valid, stored_hash, computed_hash } => format!(
            "AUDIT: seal validated - {} valid={} (stored: {}, computed: {})",
            subject,
            valid,
            stored_hash.as_deref().map(short_id).unwrap_or_else(|| "-".to_string()),
            short_id(computed_hash)
        ),
        AuditEvent::StatusChanged { from, to } => format!("AUDIT: status changed - {} {} -> {}", subject, from, to),
        AuditEvent::BallotEditRejected { field, reason } => {
            format!("AUDIT: ballot edit rejected - {} field={} reason={}", subject, field, reason)
        }
        AuditEvent::VoteCast { vote_transaction_id, position_count } => format!(
            "AUDIT: vote cast - {} positions={} (tx: {})",
            subject,
            position_count,
            short_id(vote_transaction_id)
        ),
        AuditEvent::VoteRejected { error_code, reason } => {
            format!("AUDIT: vote rejected - {} code={} reason={}", subject, error_code, reason)
        }
        AuditEvent::ReceiptIssued { vote_transaction_id, receipt_hash } => format!(
            "AUDIT: receipt issued - {} (tx: {}, receipt: {})",
            subject,
            short_id(vote_transaction_id),
            short_id(receipt_hash)
        ),
        AuditEvent::ZeroReportGenerated { report_id, content_hash } => format!(
            "AUDIT: zero report generated - {} report={} (hash: {})",
            subject,
            report_id,
            short_id(content_hash)
        ),
        AuditEvent::CountingReportGenerated { report_id, content_hash, total_ballots, skipped_votes } => format!(
            "AUDIT: counting report generated - {} report={} ballots={} skipped={} (hash: {})",
            subject,
            report_id,
            total_ballots,
            skipped_votes,
            short_id(content_hash)
        ),
        AuditEvent::IntegrityVerified {
            integrity_valid,
            stored_hash,
            computed_hash,
            votes_with_foreign_seal,
            votes_with_invalid_signature,
        } => format!(
            "AUDIT: integrity verified - {} valid={} foreign_seal={} bad_signature={} (stored: {}, computed: {})",
            subject,
            integrity_valid,
            votes_with_foreign_seal,
            votes_with_invalid_signature,
            stored_hash.as_deref().map(short_id).unwrap_or_else(|| "-".to_string()),
            short_id(computed_hash)
        ),
    }
}
