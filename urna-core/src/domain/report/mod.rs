pub mod integrity;
pub mod snapshot;
pub mod tally;

pub use integrity::{IntegrityReport, VoteChecks};
pub use snapshot::{CountingReport, ReportKind, ReportSnapshot, ZeroReport};
pub use tally::{tally_votes, zero_tally, CandidateTally, DecodedVote, PositionTally, TallyOutcome};
