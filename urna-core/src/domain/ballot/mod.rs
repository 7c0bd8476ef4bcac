pub mod record;
pub mod types;
pub mod validation;

pub use record::{build_secure_vote, signature_matches, CastContext};
pub use types::{Choice, Origin, SecureVote, Selection, VoteKind, VotePayload};
pub use validation::{validate_ballot, validate_justification, ResolvedSelection};
