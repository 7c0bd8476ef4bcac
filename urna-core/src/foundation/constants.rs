//! System-wide constants for the election core.

/// Nanoseconds per second (10^9).
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Overrides the wall clock (nanoseconds since epoch) for deterministic tests.
pub const TEST_NOW_NANOS_ENV_VAR: &str = "URNA_TEST_NOW_NANOS";

/// Base directory for the ledger and default config file.
pub const DATA_DIR_ENV_VAR: &str = "URNA_DATA_DIR";

/// Explicit path to the TOML config file.
pub const CONFIG_PATH_ENV_VAR: &str = "URNA_CONFIG_PATH";

/// Digest size in bytes (BLAKE3-256).
pub const HASH_SIZE: usize = 32;

/// XChaCha20-Poly1305 nonce size in bytes.
pub const AEAD_NONCE_SIZE: usize = 24;

/// Master secret size in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// Minimum entropy for receipt tokens.
pub const MIN_RECEIPT_TOKEN_BYTES: usize = 16;

/// Default entropy for receipt tokens.
pub const DEFAULT_RECEIPT_TOKEN_BYTES: usize = 32;

/// Default cap on justification text (bytes, before encryption).
pub const DEFAULT_MAX_JUSTIFICATION_LEN: usize = 2_000;

/// Reserved candidate id used in vote digests for blank/null selections.
pub const NO_CANDIDATE_ID: u64 = 0;

/// Wall-clock format used when ballot dates enter a digest.
pub const CANONICAL_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Coarse storage lock timeout.
pub const STORAGE_LOCK_TIMEOUT_SECS: u64 = 5;
