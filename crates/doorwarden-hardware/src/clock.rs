//! System clock backed by `std::time::Instant` and the local wall clock.

use chrono::{Datelike, Local, NaiveDateTime};
use doorwarden_core::{Error, Moment, MonotonicTime, Result, constants::MIN_WALL_CLOCK_YEAR};
use std::time::Instant;

use crate::traits::Clock;

/// Clock reading the host's monotonic counter and local time.
///
/// Monotonic readings are measured from the moment the clock was created.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Probe the wall clock and start the monotonic counter.
    ///
    /// # Errors
    ///
    /// Returns `Error::ClockUnavailable` when the wall clock reads a year
    /// before [`MIN_WALL_CLOCK_YEAR`], which means it was never set.
    pub fn new() -> Result<Self> {
        check_wall_clock(Local::now().naive_local())?;

        Ok(Self {
            origin: Instant::now(),
        })
    }
}

/// Reject a wall clock that was evidently never set.
///
/// # Errors
///
/// Returns `Error::ClockUnavailable` for readings before [`MIN_WALL_CLOCK_YEAR`].
pub fn check_wall_clock(wall: NaiveDateTime) -> Result<()> {
    let year = wall.year();
    if year < MIN_WALL_CLOCK_YEAR {
        return Err(Error::clock_unavailable(format!(
            "wall clock reads year {year}, expected {MIN_WALL_CLOCK_YEAR} or later"
        )));
    }
    Ok(())
}

impl Clock for SystemClock {
    fn now(&self) -> Moment {
        Moment::new(
            MonotonicTime::from_elapsed(self.origin.elapsed()),
            Local::now().naive_local(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn wall(year: i32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[rstest]
    #[case::rtc_reset(2000)]
    #[case::unix_epoch(1970)]
    #[case::year_before_minimum(MIN_WALL_CLOCK_YEAR - 1)]
    fn test_unset_wall_clock_rejected(#[case] year: i32) {
        let result = check_wall_clock(wall(year));
        assert!(matches!(result, Err(Error::ClockUnavailable { .. })));
    }

    #[rstest]
    #[case::minimum(MIN_WALL_CLOCK_YEAR)]
    #[case::current(2025)]
    fn test_set_wall_clock_accepted(#[case] year: i32) {
        check_wall_clock(wall(year)).unwrap();
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new().unwrap();
        let first = clock.now();
        let second = clock.now();

        assert!(second.monotonic >= first.monotonic);
        assert!(first.wall.year() >= MIN_WALL_CLOCK_YEAR);
    }
}
