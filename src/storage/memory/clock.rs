//! Time source for commits

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::lock;

/// Where commit timestamps come from.
#[derive(Clone, Debug, Default)]
pub enum Clock {
    /// Wall-clock time
    #[default]
    System,
    /// Externally driven time
    Manual(ManualClock),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Manual(clock) => clock.now(),
        }
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *lock(&self.now) = now;
    }
}
