use crate::domain::election::{Election, ElectionStatus};
use crate::foundation::UrnaError;
use log::{info, warn};

const VALID_TRANSITIONS: &[(ElectionStatus, ElectionStatus)] = &[
    (ElectionStatus::Draft, ElectionStatus::Active),
    (ElectionStatus::Active, ElectionStatus::Sealed),
    (ElectionStatus::Sealed, ElectionStatus::Completed),
    (ElectionStatus::Draft, ElectionStatus::Cancelled),
    (ElectionStatus::Active, ElectionStatus::Cancelled),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateTransitionResult {
    pub valid: bool,
    pub from_state: String,
    pub to_state: String,
    pub transition_reason: Option<String>,
}

pub fn validate_transition(from: ElectionStatus, to: ElectionStatus) -> StateTransitionResult {
    let (valid, reason) = if from == to {
        (true, Some("no_op"))
    } else if VALID_TRANSITIONS.contains(&(from, to)) {
        (true, None)
    } else {
        (false, Some("not_allowed"))
    };
    StateTransitionResult {
        valid,
        from_state: from.to_string(),
        to_state: to.to_string(),
        transition_reason: reason.map(str::to_string),
    }
}

pub fn ensure_valid_transition(from: ElectionStatus, to: ElectionStatus) -> Result<(), UrnaError> {
    let result = validate_transition(from, to);
    if result.valid {
        info!("election status transition from={} to={}", result.from_state, result.to_state);
        return Ok(());
    }
    warn!("rejected election status transition from={} to={}", result.from_state, result.to_state);
    Err(UrnaError::InvalidStateTransition { from: result.from_state, to: result.to_state })
}

/// Transitions a caller may request directly. `sealed` is only entered through the seal flow.
pub fn ensure_direct_transition(from: ElectionStatus, to: ElectionStatus) -> Result<(), UrnaError> {
    if to == ElectionStatus::Sealed && from != ElectionStatus::Sealed {
        warn!("direct seal status write rejected from={} (seal flow required)", from);
        return Err(UrnaError::InvalidStateTransition { from: from.to_string(), to: to.to_string() });
    }
    ensure_valid_transition(from, to)
}

/// Ballot-defining fields are frozen once the seal flag is set.
pub fn ensure_ballot_mutable(election: &Election, field: &str) -> Result<(), UrnaError> {
    if election.is_sealed {
        return Err(UrnaError::ElectionImmutable { election_id: election.id.value(), field: field.to_string() });
    }
    Ok(())
}
