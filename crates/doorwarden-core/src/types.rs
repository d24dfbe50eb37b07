use crate::{
    Result,
    constants::{BADGE_ID_LENGTH, BADGE_SERIAL_BYTES},
    error::Error,
    schedule::TimeOfDay,
};
use chrono::{Datelike, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;
use subtle::ConstantTimeEq;

/// Badge identifier (8 uppercase hex characters)
///
/// Derived from the 4-byte serial number a badge reports: every byte is
/// zero-padded to two hex digits and the digits are concatenated.
///
/// # Security
/// Badge identifiers are plaintext credentials. Comparison is constant-time
/// so the lookup loop does not leak how many leading characters matched.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BadgeId(String);

impl BadgeId {
    /// Create a badge identifier with validation.
    ///
    /// The input is normalized (trimmed and converted to uppercase) before
    /// validation, so `"aa11bb22"` and `" AA11BB22 "` name the same badge.
    ///
    /// # Errors
    /// Returns `Error::InvalidBadgeId` if the normalized value is not exactly
    /// 8 hexadecimal characters.
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim().to_uppercase();

        if id.len() != BADGE_ID_LENGTH {
            return Err(Error::InvalidBadgeId(format!(
                "Badge id must be {BADGE_ID_LENGTH} hex chars, got {} in '{id}'",
                id.len()
            )));
        }

        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidBadgeId(format!(
                "Badge id must be hexadecimal, got '{id}'"
            )));
        }

        Ok(BadgeId(id))
    }

    /// Build the identifier from the raw serial bytes reported by a reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorwarden_core::BadgeId;
    ///
    /// let id = BadgeId::from_serial([0x53, 0x62, 0x24, 0x39]);
    /// assert_eq!(id.as_str(), "53622439");
    ///
    /// let id = BadgeId::from_serial([0x0A, 0x01, 0x00, 0xFF]);
    /// assert_eq!(id.as_str(), "0A0100FF");
    /// ```
    #[must_use]
    pub fn from_serial(serial: [u8; BADGE_SERIAL_BYTES]) -> Self {
        BadgeId(serial.iter().map(|b| format!("{b:02X}")).collect())
    }

    /// Get the badge identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BadgeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BadgeId::new(s)
    }
}

impl TryFrom<String> for BadgeId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        BadgeId::new(&value)
    }
}

impl From<BadgeId> for String {
    fn from(id: BadgeId) -> Self {
        id.0
    }
}

/// Constant-time comparison implementation for BadgeId
impl PartialEq for BadgeId {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::hash::Hash for BadgeId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Reading of a monotonic tick source.
///
/// Measured as elapsed time since the controller started. Unlock deadlines are
/// always expressed in this unit so that adjusting the wall clock during an
/// active hold never moves a deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonotonicTime(Duration);

impl MonotonicTime {
    /// The tick source origin.
    pub const ZERO: MonotonicTime = MonotonicTime(Duration::ZERO);

    /// Create a reading from elapsed time since the origin.
    #[must_use]
    pub const fn from_elapsed(elapsed: Duration) -> Self {
        MonotonicTime(elapsed)
    }

    /// Create a reading from milliseconds since the origin.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        MonotonicTime(Duration::from_millis(millis))
    }

    /// Elapsed time since the origin.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.0
    }

    /// Milliseconds since the origin.
    #[must_use]
    pub fn as_millis(&self) -> u128 {
        self.0.as_millis()
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    #[must_use]
    pub fn saturating_duration_since(&self, earlier: MonotonicTime) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for MonotonicTime {
    type Output = MonotonicTime;

    fn add(self, rhs: Duration) -> MonotonicTime {
        MonotonicTime(self.0.saturating_add(rhs))
    }
}

impl Sub for MonotonicTime {
    type Output = Duration;

    fn sub(self, rhs: MonotonicTime) -> Duration {
        self.saturating_duration_since(rhs)
    }
}

impl fmt::Display for MonotonicTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "t+{}ms", self.0.as_millis())
    }
}

/// A single clock reading: monotonic ticks plus local wall-clock time.
///
/// The wall-clock part drives window checks and every human-facing
/// timestamp; the monotonic part drives deadline arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    /// Monotonic reading used for deadlines.
    pub monotonic: MonotonicTime,

    /// Local wall-clock date and time (second resolution is meaningful).
    pub wall: NaiveDateTime,
}

impl Moment {
    /// Create a moment from both readings.
    #[must_use]
    pub fn new(monotonic: MonotonicTime, wall: NaiveDateTime) -> Self {
        Self { monotonic, wall }
    }

    /// Day of the week of the wall-clock reading.
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.wall.weekday()
    }

    /// Minute-resolution time of day of the wall-clock reading.
    #[must_use]
    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_time(self.wall.time())
    }

    /// The same moment advanced by `delta` on both readings.
    #[must_use]
    pub fn advanced_by(&self, delta: Duration) -> Self {
        let wall = chrono::Duration::from_std(delta)
            .ok()
            .and_then(|d| self.wall.checked_add_signed(d))
            .unwrap_or(self.wall);

        Self {
            monotonic: self.monotonic + delta,
            wall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    #[case("AA11BB22", "AA11BB22")]
    #[case("aa11bb22", "AA11BB22")]
    #[case("  deadBeef ", "DEADBEEF")]
    #[case("00000000", "00000000")]
    fn test_badge_id_valid(#[case] input: &str, #[case] expected: &str) {
        let id = BadgeId::new(input).unwrap();
        assert_eq!(id.as_str(), expected);
    }

    #[rstest]
    #[case("")] // empty
    #[case("AA11BB2")] // too short
    #[case("AA11BB223")] // too long
    #[case("GG11BB22")] // not hex
    #[case("AA11 B22")] // inner whitespace
    fn test_badge_id_invalid(#[case] input: &str) {
        let result = BadgeId::new(input);
        assert!(matches!(result, Err(Error::InvalidBadgeId(_))));
    }

    #[test]
    fn test_badge_id_from_serial_pads_bytes() {
        let id = BadgeId::from_serial([0x53, 0x8A, 0x1C, 0x2F]);
        assert_eq!(id.as_str(), "538A1C2F");

        let id = BadgeId::from_serial([0x00, 0x01, 0x0F, 0x10]);
        assert_eq!(id.as_str(), "00010F10");
    }

    #[test]
    fn test_badge_id_case_insensitive_equality() {
        assert_eq!(
            BadgeId::new("deadbeef").unwrap(),
            BadgeId::new("DEADBEEF").unwrap()
        );
        assert_ne!(
            BadgeId::new("DEADBEEF").unwrap(),
            BadgeId::new("DEADBEEE").unwrap()
        );
    }

    #[test]
    fn test_badge_id_serde_validates() {
        let id: BadgeId = serde_json::from_str("\"aa11bb22\"").unwrap();
        assert_eq!(id.as_str(), "AA11BB22");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"AA11BB22\"");

        let bad: std::result::Result<BadgeId, _> = serde_json::from_str("\"xyz\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_monotonic_arithmetic() {
        let start = MonotonicTime::from_millis(1_000);
        let later = start + Duration::from_secs(60);

        assert_eq!(later.as_millis(), 61_000);
        assert_eq!(later - start, Duration::from_secs(60));
        // Subtraction saturates instead of underflowing
        assert_eq!(start - later, Duration::ZERO);
        assert!(later > start);
    }

    #[test]
    fn test_moment_derives_weekday_and_time_of_day() {
        // 2025-05-20 is a Tuesday
        let wall = NaiveDate::from_ymd_opt(2025, 5, 20)
            .unwrap()
            .and_hms_opt(9, 30, 45)
            .unwrap();
        let moment = Moment::new(MonotonicTime::ZERO, wall);

        assert_eq!(moment.weekday(), Weekday::Tue);
        assert_eq!(moment.time_of_day(), TimeOfDay::new(9, 30).unwrap());
    }

    #[test]
    fn test_moment_advanced_by_moves_both_readings() {
        let wall = NaiveDate::from_ymd_opt(2025, 5, 20)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        let moment = Moment::new(MonotonicTime::from_millis(500), wall);
        let later = moment.advanced_by(Duration::from_secs(120));

        assert_eq!(later.monotonic.as_millis(), 120_500);
        assert_eq!(later.weekday(), Weekday::Wed);
        assert_eq!(later.time_of_day(), TimeOfDay::new(0, 1).unwrap());
    }
}
