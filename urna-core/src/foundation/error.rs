use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ElectionNotFound,
    PositionNotFound,
    CandidateNotFound,
    VoterNotFound,
    AdministratorNotFound,
    ReceiptNotFound,
    ElectionNotSealed,
    ElectionAlreadySealed,
    ElectionImmutable,
    VotingNotStarted,
    VotingEnded,
    ElectionClosed,
    InvalidStateTransition,
    VoterInactive,
    Unauthorized,
    AlreadyVoted,
    ReportAlreadyExists,
    ConcurrentModification,
    IncompletePositions,
    DuplicatePosition,
    PositionNotInElection,
    InvalidCandidate,
    EmptyBallot,
    VotesAlreadyCast,
    JustificationTooLong,
    IntegrityMismatch,
    StorageError,
    StorageLockTimeout,
    SchemaMismatch,
    SerializationError,
    CryptoError,
    ConfigError,
    EncodingError,
    InvalidTimezone,
    Message,
}

/// Caller-facing grouping of failures.
///
/// Everything except `Infrastructure` carries a specific, reportable reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    State,
    Conflict,
    Validation,
    Integrity,
    Infrastructure,
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub category: ErrorCategory,
    pub message: String,
}

/// Which end of the voting window was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowViolation {
    NotStarted,
    Ended,
}

#[derive(Debug, Error)]
pub enum UrnaError {
    // === Not found ===
    #[error("election not found: {0}")]
    ElectionNotFound(u64),

    #[error("position not found: {0}")]
    PositionNotFound(u64),

    #[error("candidate not found: {0}")]
    CandidateNotFound(u64),

    #[error("voter not found: {0}")]
    VoterNotFound(u64),

    #[error("administrator not found: {0}")]
    AdministratorNotFound(u64),

    #[error("receipt not found")]
    ReceiptNotFound,

    // === State ===
    #[error("election {election_id} is not sealed")]
    ElectionNotSealed { election_id: u64 },

    #[error("election {election_id} is already sealed")]
    ElectionAlreadySealed { election_id: u64 },

    #[error("election {election_id} is sealed; ballot definition is immutable ({field})")]
    ElectionImmutable { election_id: u64, field: String },

    #[error("voting for election {election_id} has not started (opens at {starts_at})")]
    VotingNotStarted { election_id: u64, starts_at: String },

    #[error("voting for election {election_id} has ended (closed at {ended_at})")]
    VotingEnded { election_id: u64, ended_at: String },

    #[error("election {election_id} is closed (status {status})")]
    ElectionClosed { election_id: u64, status: String },

    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("voter {voter_id} is inactive")]
    VoterInactive { voter_id: u64 },

    #[error("administrator {admin_id} may not act on election {election_id}")]
    Unauthorized { admin_id: u64, election_id: u64 },

    #[error("election {election_id} already has committed votes")]
    VotesAlreadyCast { election_id: u64 },

    // === Conflict ===
    #[error("voter {voter_id} already voted in election {election_id}")]
    AlreadyVoted { voter_id: u64, election_id: u64 },

    #[error("{kind} report already exists for election {election_id}")]
    ReportAlreadyExists { election_id: u64, kind: String },

    #[error("election {election_id} changed concurrently (expected revision {expected}, found {actual})")]
    ConcurrentModification { election_id: u64, expected: u64, actual: u64 },

    // === Validation ===
    #[error("ballot must cover all {expected} positions, got {provided}")]
    IncompletePositions { expected: usize, provided: usize },

    #[error("position {position_id} appears more than once in the ballot")]
    DuplicatePosition { position_id: u64 },

    #[error("position {position_id} does not belong to election {election_id}")]
    PositionNotInElection { position_id: u64, election_id: u64 },

    #[error("candidate {candidate_id} is not a valid choice for position {position_id}: {reason}")]
    InvalidCandidate { candidate_id: u64, position_id: u64, reason: String },

    #[error("election {election_id} has no ballot to seal: {reason}")]
    EmptyBallot { election_id: u64, reason: String },

    #[error("justification length {len} exceeds max {max}")]
    JustificationTooLong { len: usize, max: usize },

    // === Integrity ===
    #[error("seal hash mismatch for election {election_id}: stored={stored} computed={computed}")]
    IntegrityMismatch { election_id: u64, stored: String, computed: String },

    // === Infrastructure ===
    #[error("storage error during {operation}: {details}")]
    StorageError { operation: String, details: String },

    #[error("storage lock timeout: {operation} (waited {timeout_secs}s)")]
    StorageLockTimeout { operation: String, timeout_secs: u64 },

    #[error("schema mismatch: stored={stored} current={current}")]
    SchemaMismatch { stored: u32, current: u32 },

    #[error("{format} serialization error: {details}")]
    SerializationError { format: String, details: String },

    #[error("crypto error during {operation}: {details}")]
    CryptoError { operation: String, details: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, UrnaError>;

impl UrnaError {
    pub fn code(&self) -> ErrorCode {
        match self {
            UrnaError::ElectionNotFound(_) => ErrorCode::ElectionNotFound,
            UrnaError::PositionNotFound(_) => ErrorCode::PositionNotFound,
            UrnaError::CandidateNotFound(_) => ErrorCode::CandidateNotFound,
            UrnaError::VoterNotFound(_) => ErrorCode::VoterNotFound,
            UrnaError::AdministratorNotFound(_) => ErrorCode::AdministratorNotFound,
            UrnaError::ReceiptNotFound => ErrorCode::ReceiptNotFound,
            UrnaError::ElectionNotSealed { .. } => ErrorCode::ElectionNotSealed,
            UrnaError::ElectionAlreadySealed { .. } => ErrorCode::ElectionAlreadySealed,
            UrnaError::ElectionImmutable { .. } => ErrorCode::ElectionImmutable,
            UrnaError::VotingNotStarted { .. } => ErrorCode::VotingNotStarted,
            UrnaError::VotingEnded { .. } => ErrorCode::VotingEnded,
            UrnaError::ElectionClosed { .. } => ErrorCode::ElectionClosed,
            UrnaError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            UrnaError::VoterInactive { .. } => ErrorCode::VoterInactive,
            UrnaError::Unauthorized { .. } => ErrorCode::Unauthorized,
            UrnaError::VotesAlreadyCast { .. } => ErrorCode::VotesAlreadyCast,
            UrnaError::AlreadyVoted { .. } => ErrorCode::AlreadyVoted,
            UrnaError::ReportAlreadyExists { .. } => ErrorCode::ReportAlreadyExists,
            UrnaError::ConcurrentModification { .. } => ErrorCode::ConcurrentModification,
            UrnaError::IncompletePositions { .. } => ErrorCode::IncompletePositions,
            UrnaError::DuplicatePosition { .. } => ErrorCode::DuplicatePosition,
            UrnaError::PositionNotInElection { .. } => ErrorCode::PositionNotInElection,
            UrnaError::InvalidCandidate { .. } => ErrorCode::InvalidCandidate,
            UrnaError::EmptyBallot { .. } => ErrorCode::EmptyBallot,
            UrnaError::JustificationTooLong { .. } => ErrorCode::JustificationTooLong,
            UrnaError::IntegrityMismatch { .. } => ErrorCode::IntegrityMismatch,
            UrnaError::StorageError { .. } => ErrorCode::StorageError,
            UrnaError::StorageLockTimeout { .. } => ErrorCode::StorageLockTimeout,
            UrnaError::SchemaMismatch { .. } => ErrorCode::SchemaMismatch,
            UrnaError::SerializationError { .. } => ErrorCode::SerializationError,
            UrnaError::CryptoError { .. } => ErrorCode::CryptoError,
            UrnaError::ConfigError(_) => ErrorCode::ConfigError,
            UrnaError::EncodingError(_) => ErrorCode::EncodingError,
            UrnaError::InvalidTimezone(_) => ErrorCode::InvalidTimezone,
            UrnaError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            ErrorCode::ElectionNotFound
            | ErrorCode::PositionNotFound
            | ErrorCode::CandidateNotFound
            | ErrorCode::VoterNotFound
            | ErrorCode::AdministratorNotFound
            | ErrorCode::ReceiptNotFound => ErrorCategory::NotFound,
            ErrorCode::ElectionNotSealed
            | ErrorCode::ElectionAlreadySealed
            | ErrorCode::ElectionImmutable
            | ErrorCode::VotingNotStarted
            | ErrorCode::VotingEnded
            | ErrorCode::ElectionClosed
            | ErrorCode::InvalidStateTransition
            | ErrorCode::VoterInactive
            | ErrorCode::Unauthorized
            | ErrorCode::VotesAlreadyCast => ErrorCategory::State,
            ErrorCode::AlreadyVoted | ErrorCode::ReportAlreadyExists | ErrorCode::ConcurrentModification => ErrorCategory::Conflict,
            ErrorCode::IncompletePositions
            | ErrorCode::DuplicatePosition
            | ErrorCode::PositionNotInElection
            | ErrorCode::InvalidCandidate
            | ErrorCode::EmptyBallot
            | ErrorCode::JustificationTooLong => ErrorCategory::Validation,
            ErrorCode::IntegrityMismatch => ErrorCategory::Integrity,
            ErrorCode::StorageError
            | ErrorCode::StorageLockTimeout
            | ErrorCode::SchemaMismatch
            | ErrorCode::SerializationError
            | ErrorCode::CryptoError
            | ErrorCode::ConfigError
            | ErrorCode::EncodingError
            | ErrorCode::InvalidTimezone
            | ErrorCode::Message => ErrorCategory::Infrastructure,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), category: self.category(), message: self.to_string() }
    }

    /// True when the failure is a sealed-election conflict rather than a missing precondition.
    pub fn is_already_sealed(&self) -> bool {
        matches!(self, UrnaError::ElectionAlreadySealed { .. })
    }

    pub fn window_violation(&self) -> Option<WindowViolation> {
        match self {
            UrnaError::VotingNotStarted { .. } => Some(WindowViolation::NotStarted),
            UrnaError::VotingEnded { .. } => Some(WindowViolation::Ended),
            _ => None,
        }
    }

    pub fn crypto(operation: impl Into<String>, details: impl Into<String>) -> Self {
        UrnaError::CryptoError { operation: operation.into(), details: details.into() }
    }

    pub fn invalid_candidate(candidate_id: u64, position_id: u64, reason: impl Into<String>) -> Self {
        UrnaError::InvalidCandidate { candidate_id, position_id, reason: reason.into() }
    }
}

impl From<hex::FromHexError> for UrnaError {
    fn from(err: hex::FromHexError) -> Self {
        UrnaError::EncodingError(format!("hex decode error: {}", err))
    }
}

impl From<toml::ser::Error> for UrnaError {
    fn from(err: toml::ser::Error) -> Self {
        UrnaError::SerializationError { format: "toml".to_string(), details: err.to_string() }
    }
}

impl From<figment::Error> for UrnaError {
    fn from(err: figment::Error) -> Self {
        UrnaError::ConfigError(format!("config extraction failed: {}", err))
    }
}

impl From<rocksdb::Error> for UrnaError {
    fn from(err: rocksdb::Error) -> Self {
        UrnaError::StorageError { operation: "rocksdb".to_string(), details: err.to_string() }
    }
}

impl From<bincode::Error> for UrnaError {
    fn from(err: bincode::Error) -> Self {
        UrnaError::SerializationError { format: "bincode".to_string(), details: err.to_string() }
    }
}

impl From<serde_json::Error> for UrnaError {
    fn from(err: serde_json::Error) -> Self {
        UrnaError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

impl From<io::Error> for UrnaError {
    fn from(err: io::Error) -> Self {
        UrnaError::StorageError { operation: "io".to_string(), details: err.to_string() }
    }
}

#[macro_export]
macro_rules! storage_err {
    ($op:expr, $err:expr) => {
        $crate::foundation::UrnaError::StorageError { operation: $op.into(), details: $err.to_string() }
    };
}

// NOTE: Avoid adding generic "stringly" error conversions here.
// Use structured `UrnaError` variants at the call site to preserve context.
