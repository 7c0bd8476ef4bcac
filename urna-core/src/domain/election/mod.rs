pub mod edit;
pub mod model;
pub mod seal;
pub mod state_machine;

pub use edit::{BallotEdit, EditPlan};
pub use model::{Administrator, Candidate, Election, ElectionStatus, Position, Voter, VotingWindow, WindowPosition};
pub use seal::{compute_seal_hash, seal_blockers, status_label, BallotDefinition, SealRecord, SealResult, SealStatus};
pub use state_machine::{ensure_ballot_mutable, ensure_direct_transition, ensure_valid_transition, validate_transition, StateTransitionResult};
