//! Environment abstraction for deterministic testing.
//!
//! Decouples client logic from the wall clock. Message receive times and
//! credential expiry both come from [`Environment::now`], so simulation can
//! pin or advance time explicitly.

use chrono::{DateTime, Utc};

/// Abstract environment providing wall-clock time.
///
/// # Invariants
///
/// - `now()` is the time at which the caller observes an event. Inbound
///   messages are stamped with it on arrival, never with a sender's clock.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production environment backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a system environment.
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
