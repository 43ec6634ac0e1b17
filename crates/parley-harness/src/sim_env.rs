//! Simulated environment with a manually advanced clock.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use parley_client::Environment;

/// Seconds since the Unix epoch of the default simulated start time,
/// 2026-01-01T00:00:00Z.
pub const SIM_EPOCH_SECS: i64 = 1_767_225_600;

/// Deterministic [`Environment`] for simulation.
///
/// Time only moves when the test says so. Clones share the same clock, so a
/// test can keep a handle and advance time after handing the environment to
/// a runtime.
#[derive(Debug, Clone)]
pub struct SimEnv {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl SimEnv {
    /// Environment starting at [`SIM_EPOCH_SECS`].
    pub fn new() -> Self {
        Self::at(DateTime::from_timestamp(SIM_EPOCH_SECS, 0).unwrap_or_default())
    }

    /// Environment starting at `start`.
    pub fn at(start: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Jump the clock to `time`.
    pub fn set(&self, time: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = time;
    }
}

impl Environment for SimEnv {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
