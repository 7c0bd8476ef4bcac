//! Domain layer: pure election logic, no I/O.

pub mod audit;
pub mod ballot;
pub mod crypto;
pub mod election;
pub mod receipt;
pub mod report;

pub use audit::{Actor, AuditEntry, AuditEvent};
pub use ballot::{Choice, Origin, SecureVote, Selection, VoteKind, VotePayload};
pub use crypto::VoteCrypto;
pub use election::{
    Administrator, BallotDefinition, BallotEdit, Candidate, Election, ElectionStatus, Position, SealRecord, SealResult, SealStatus, Voter,
    VotingWindow,
};
pub use receipt::{Receipt, VoteDetail, VoteReceipt};
pub use report::{CountingReport, IntegrityReport, ReportKind, ReportSnapshot, ZeroReport};
