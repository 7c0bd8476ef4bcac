use crate::foundation::{UrnaError, NANOS_PER_SECOND};
use chrono::{DateTime, TimeZone, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn current_timestamp_nanos_env(env_var: Option<&str>) -> Result<u64, UrnaError> {
    if let Some(var) = env_var {
        if let Ok(value) = std::env::var(var) {
            return value.trim().parse::<u64>().map_err(|err| UrnaError::Message(format!("{var}: {err}")));
        }
    }
    let now = SystemTime::now().duration_since(UNIX_EPOCH).map_err(|err| UrnaError::Message(err.to_string()))?;
    Ok(now.as_secs().saturating_mul(NANOS_PER_SECOND).saturating_add(u64::from(now.subsec_nanos())))
}

/// Returns the current wall-clock timestamp in nanoseconds.
///
/// For test determinism, this respects `TEST_NOW_NANOS_ENV_VAR` when set.
pub fn now_nanos() -> u64 {
    current_timestamp_nanos_env(Some(crate::foundation::constants::TEST_NOW_NANOS_ENV_VAR))
        .or_else(|_| current_timestamp_nanos_env(None))
        .unwrap_or(0)
}

pub fn datetime_from_nanos(nanos: u64) -> DateTime<Utc> {
    let nanos = i64::try_from(nanos).unwrap_or(i64::MAX);
    Utc.timestamp_nanos(nanos)
}

/// Source of the canonical current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        datetime_from_nanos(now_nanos())
    }
}

/// Clock pinned to a settable instant.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug)]
pub struct FixedClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: std::sync::Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|guard| *guard).unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}
