use crate::foundation::{DEFAULT_MAX_JUSTIFICATION_LEN, DEFAULT_RECEIPT_TOKEN_BYTES};
use figment::value::{Dict, Map};
use serde::{Deserialize, Serialize};

/// Which ledger backend the core runs against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// In-process maps; only meaningful for tests and dry runs.
    #[serde(alias = "mem")]
    Memory,
    #[default]
    #[serde(alias = "rocksdb")]
    Rocks,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Rocks => write!(f, "rocks"),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory holding the ledger; filled from the resolved data dir when empty.
    #[serde(default)]
    pub data_dir: String,
    /// Wipe the ledger if its schema version does not match. Never enable against real elections.
    #[serde(default)]
    pub allow_schema_wipe: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// 32-byte master secret (hex) from which payload and justification keys are derived.
    #[serde(default)]
    pub vote_secret_hex: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VotingConfig {
    #[serde(default = "default_receipt_token_bytes")]
    pub receipt_token_bytes: usize,
    #[serde(default = "default_max_justification_len")]
    pub max_justification_len: usize,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self { receipt_token_bytes: DEFAULT_RECEIPT_TOKEN_BYTES, max_justification_len: DEFAULT_MAX_JUSTIFICATION_LEN }
    }
}

fn default_receipt_token_bytes() -> usize {
    DEFAULT_RECEIPT_TOKEN_BYTES
}

fn default_max_justification_len() -> usize {
    DEFAULT_MAX_JUSTIFICATION_LEN
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Optional JSON-lines audit file (defaults to none).
    #[serde(default)]
    pub file_path: Option<String>,
    /// Mirror audit entries through the `log` facade.
    #[serde(default = "default_true")]
    pub structured_log: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { file_path: None, structured_log: true }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for `urna.log` / `urna_err.log`; console only when unset.
    #[serde(default)]
    pub log_dir: Option<String>,
    /// `RUST_LOG`-style filter string, e.g. `info,urna_core::application=debug`.
    #[serde(default)]
    pub filters: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub crypto: CryptoConfig,
    #[serde(default)]
    pub voting: VotingConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default, skip_serializing)]
    pub profiles: Option<Map<String, Dict>>,
}
