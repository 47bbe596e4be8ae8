//! Desk clock: the single source of "now" for ageing and audit stamps.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

#[derive(Debug)]
pub enum Clock {
    System,
    /// Frozen at a given instant; tests move it with `advance()`.
    Fixed(Mutex<DateTime<Utc>>),
}

impl Clock {
    pub fn system() -> Self {
        Self::System
    }

    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(Mutex::new(at))
    }

    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at.lock().unwrap_or_else(|e| e.into_inner()),
        }
    }

    /// Move a fixed clock forward. No-op on the system clock.
    pub fn advance(&self, by: Duration) {
        if let Self::Fixed(at) = self {
            let mut guard = at.lock().unwrap_or_else(|e| e.into_inner());
            *guard += by;
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::System
    }
}
