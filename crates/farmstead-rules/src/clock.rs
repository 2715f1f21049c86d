//! Wall-clock source for growth accrual.
//!
//! Engines read time through a [`FarmClock`] so tests can drive growth
//! deterministically with a [`ManualClock`] instead of sleeping.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};

/// Time source used by the engines.
#[derive(Debug, Clone, Default)]
pub enum FarmClock {
    /// The system clock.
    #[default]
    System,
    /// A manually advanced clock shared with the test that drives it.
    Manual(ManualClock),
}

impl FarmClock {
    /// Current time.
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Manual(clock) => clock.now(),
        }
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(start.timestamp_millis())),
        }
    }

    /// Current time.
    pub fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }

    /// Move the clock forward. Saturates instead of overflowing.
    pub fn advance(&self, by: TimeDelta) {
        let delta = by.num_milliseconds();
        let _ = self
            .millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(delta))
            });
    }

    /// Set the clock to `at`.
    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualClock::starting_at(DateTime::<Utc>::default());
        let farm_clock = FarmClock::Manual(clock.clone());
        clock.advance(TimeDelta::minutes(30));
        assert_eq!(farm_clock.now().timestamp(), 1800);
    }

    #[test]
    fn set_jumps_to_an_exact_time() {
        let clock = ManualClock::starting_at(DateTime::<Utc>::default());
        clock.advance(TimeDelta::hours(5));
        let at = DateTime::<Utc>::default() + TimeDelta::minutes(90);
        clock.set(at);
        assert_eq!(clock.now(), at);
        assert_eq!(FarmClock::Manual(clock).now().timestamp(), 5400);
    }
}
