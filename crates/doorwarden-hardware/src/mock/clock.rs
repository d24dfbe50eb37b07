//! Mock clock advanced manually from tests.

use crate::traits::Clock;
use chrono::NaiveDateTime;
use doorwarden_core::{Moment, MonotonicTime};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Mock clock whose readings only change through its handle.
///
/// # Examples
///
/// ```
/// use doorwarden_hardware::mock::MockClock;
/// use doorwarden_hardware::traits::Clock;
/// use chrono::NaiveDate;
/// use std::time::Duration;
///
/// let start = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let (clock, handle) = MockClock::new(start);
///
/// handle.advance(Duration::from_secs(90));
/// assert_eq!(clock.now().monotonic.as_millis(), 90_000);
/// assert_eq!(clock.now().time_of_day().to_string(), "09:01");
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<Moment>>,
}

impl MockClock {
    /// Create a clock reading `wall` at monotonic zero.
    pub fn new(wall: NaiveDateTime) -> (Self, MockClockHandle) {
        let current = Arc::new(Mutex::new(Moment::new(MonotonicTime::ZERO, wall)));
        (
            Self {
                current: current.clone(),
            },
            MockClockHandle { current },
        )
    }
}

impl Clock for MockClock {
    fn now(&self) -> Moment {
        *lock(&self.current)
    }
}

/// Handle for moving a mock clock.
#[derive(Debug, Clone)]
pub struct MockClockHandle {
    current: Arc<Mutex<Moment>>,
}

impl MockClockHandle {
    /// Advance both the monotonic and the wall-clock readings.
    pub fn advance(&self, delta: Duration) {
        let mut current = lock(&self.current);
        *current = current.advanced_by(delta);
    }

    /// Set the wall clock without touching the monotonic reading.
    ///
    /// Simulates an operator adjusting the time during operation.
    pub fn set_wall(&self, wall: NaiveDateTime) {
        lock(&self.current).wall = wall;
    }

    /// Current reading.
    pub fn now(&self) -> Moment {
        *lock(&self.current)
    }
}

fn lock(current: &Mutex<Moment>) -> MutexGuard<'_, Moment> {
    current.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_mock_clock_advance() {
        let (clock, handle) = MockClock::new(start());
        assert_eq!(clock.now().monotonic, MonotonicTime::ZERO);

        handle.advance(Duration::from_secs(3600));
        let now = clock.now();
        assert_eq!(now.monotonic.elapsed(), Duration::from_secs(3600));
        assert_eq!(now.time_of_day().to_string(), "10:00");
    }

    #[test]
    fn test_set_wall_keeps_monotonic() {
        let (clock, handle) = MockClock::new(start());
        handle.advance(Duration::from_secs(10));

        let adjusted = NaiveDate::from_ymd_opt(2025, 5, 20)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        handle.set_wall(adjusted);

        let now = clock.now();
        assert_eq!(now.wall, adjusted);
        assert_eq!(now.monotonic.elapsed(), Duration::from_secs(10));
        assert_eq!(handle.now(), now);
    }
}
