//! Application layer: orchestration across domain logic and infrastructure I/O.

mod casting;
mod context;
mod integrity;
mod lifecycle;
mod receipts;
mod reports;
mod seal;

pub use casting::VotingReadiness;
pub use context::{ElectionCore, VotingSettings};
pub use seal::SealValidation;
