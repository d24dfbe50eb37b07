//! Time-of-day and weekday primitives for access windows.
//!
//! Windows are midnight-naive: they start and end on the same calendar day,
//! at minute resolution. A window whose end precedes its start is invalid and
//! never matches; overnight schedules are not supported.

use crate::{Result, constants::MINUTES_PER_DAY, error::Error};
use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minute-resolution time of day (`00:00` to `23:59`).
///
/// Serialized as an `"HH:MM"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Start of the day.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Last minute of the day.
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay(MINUTES_PER_DAY - 1);

    /// Create a time of day with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidTimeOfDay` if `hour > 23` or `minute > 59`.
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(Error::InvalidTimeOfDay(format!(
                "{hour:02}:{minute:02} is not a valid time of day"
            )));
        }
        Ok(TimeOfDay(u16::from(hour) * 60 + u16::from(minute)))
    }

    /// Truncate a wall-clock time to minute resolution.
    #[must_use]
    pub fn from_time(time: NaiveTime) -> Self {
        // hour() < 24 and minute() < 60, so this always fits below MINUTES_PER_DAY
        TimeOfDay((time.hour() * 60 + time.minute()) as u16)
    }

    /// Minutes elapsed since midnight.
    #[must_use]
    pub fn total_minutes(&self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn hour(&self) -> u8 {
        (self.0 / 60) as u8
    }

    #[must_use]
    pub fn minute(&self) -> u8 {
        (self.0 % 60) as u8
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = Error;

    /// Parse `"HH:MM"` (24-hour, one or two hour digits).
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidTimeOfDay(format!("expected HH:MM, got '{s}'"));

        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }

        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

/// Set of weekdays on which a profile is accepted.
///
/// Stored as a 7-bit mask indexed from Sunday. Serialized as a list of day
/// names (`["Mon", "Tue"]`); any spelling `chrono::Weekday` parses is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// No days at all.
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    /// Every day of the week.
    pub const ALL: WeekdaySet = WeekdaySet(0b0111_1111);

    /// Monday through Friday.
    pub const WEEKDAYS: WeekdaySet = WeekdaySet(0b0011_1110);

    /// Saturday and Sunday.
    pub const WEEKEND: WeekdaySet = WeekdaySet(0b0100_0001);

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_sunday()
    }

    /// Build a set from individual days.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorwarden_core::WeekdaySet;
    /// use chrono::Weekday;
    ///
    /// let days = WeekdaySet::from_days([Weekday::Mon, Weekday::Wed]);
    /// assert!(days.contains(Weekday::Wed));
    /// assert!(!days.contains(Weekday::Tue));
    /// ```
    #[must_use]
    pub fn from_days(days: impl IntoIterator<Item = Weekday>) -> Self {
        days.into_iter().fold(WeekdaySet::EMPTY, |set, day| set.with(day))
    }

    /// The set with `day` added.
    #[must_use]
    pub fn with(self, day: Weekday) -> Self {
        WeekdaySet(self.0 | Self::bit(day))
    }

    /// Check whether `day` is in the set.
    #[must_use]
    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Days in the set, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        [
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ]
        .into_iter()
        .filter(|day| self.contains(*day))
    }
}

impl From<Vec<Weekday>> for WeekdaySet {
    fn from(days: Vec<Weekday>) -> Self {
        WeekdaySet::from_days(days)
    }
}

impl From<WeekdaySet> for Vec<Weekday> {
    fn from(set: WeekdaySet) -> Self {
        set.iter().collect()
    }
}

/// Daily time-of-day interval, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl AccessWindow {
    /// The whole day, `00:00` to `23:59`.
    pub const ALL_DAY: AccessWindow = AccessWindow {
        start: TimeOfDay::MIDNIGHT,
        end: TimeOfDay::LAST_MINUTE,
    };

    #[must_use]
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// A window is valid only when it does not span midnight.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Check whether `time` lies in `[start, end]`.
    ///
    /// Invalid windows never match.
    #[must_use]
    pub fn contains(&self, time: TimeOfDay) -> bool {
        self.is_valid() && self.start <= time && time <= self.end
    }

    /// Whole minutes from `time` until the end of the window.
    ///
    /// Zero at the closing minute, and zero (never negative) past it.
    #[must_use]
    pub fn minutes_remaining(&self, time: TimeOfDay) -> u16 {
        self.end.total_minutes().saturating_sub(time.total_minutes())
    }
}

impl fmt::Display for AccessWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[rstest]
    #[case("00:00", 0)]
    #[case("08:00", 480)]
    #[case("8:05", 485)]
    #[case("17:00", 1020)]
    #[case("23:59", 1439)]
    fn test_time_of_day_parse(#[case] input: &str, #[case] minutes: u16) {
        assert_eq!(t(input).total_minutes(), minutes);
    }

    #[rstest]
    #[case("24:00")]
    #[case("12:60")]
    #[case("1200")]
    #[case("12:5")]
    #[case(":30")]
    #[case("ab:cd")]
    fn test_time_of_day_parse_invalid(#[case] input: &str) {
        let result: Result<TimeOfDay> = input.parse();
        assert!(matches!(result, Err(Error::InvalidTimeOfDay(_))));
    }

    #[test]
    fn test_time_of_day_display_is_zero_padded() {
        assert_eq!(TimeOfDay::new(8, 5).unwrap().to_string(), "08:05");
        assert_eq!(TimeOfDay::LAST_MINUTE.to_string(), "23:59");
    }

    #[test]
    fn test_time_of_day_from_time_truncates_seconds() {
        let time = NaiveTime::from_hms_opt(16, 59, 59).unwrap();
        assert_eq!(TimeOfDay::from_time(time), t("16:59"));
    }

    #[test]
    fn test_weekday_presets() {
        for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
            assert!(WeekdaySet::WEEKDAYS.contains(day));
            assert!(!WeekdaySet::WEEKEND.contains(day));
        }
        for day in [Weekday::Sat, Weekday::Sun] {
            assert!(WeekdaySet::WEEKEND.contains(day));
            assert!(!WeekdaySet::WEEKDAYS.contains(day));
        }
        assert_eq!(WeekdaySet::ALL.iter().count(), 7);
        assert!(WeekdaySet::EMPTY.is_empty());
    }

    #[test]
    fn test_weekday_set_serde_accepts_day_names() {
        let set: WeekdaySet = serde_json::from_str(r#"["Mon", "tuesday", "FRI"]"#).unwrap();
        assert_eq!(
            set,
            WeekdaySet::from_days([Weekday::Mon, Weekday::Tue, Weekday::Fri])
        );

        let json = serde_json::to_string(&WeekdaySet::WEEKEND).unwrap();
        assert_eq!(json, r#"["Sun","Sat"]"#);
    }

    #[rstest]
    #[case("08:00", true)] // start is inclusive
    #[case("12:30", true)]
    #[case("17:00", true)] // end is inclusive
    #[case("07:59", false)]
    #[case("17:01", false)]
    fn test_window_contains(#[case] time: &str, #[case] expected: bool) {
        let window = AccessWindow::new(t("08:00"), t("17:00"));
        assert_eq!(window.contains(t(time)), expected);
    }

    #[test]
    fn test_inverted_window_never_matches() {
        let window = AccessWindow::new(t("22:00"), t("06:00"));
        assert!(!window.is_valid());
        assert!(!window.contains(t("23:00")));
        assert!(!window.contains(t("03:00")));
        assert!(!window.contains(t("12:00")));
    }

    #[test]
    fn test_minutes_remaining() {
        let window = AccessWindow::new(t("08:00"), t("17:00"));
        assert_eq!(window.minutes_remaining(t("09:00")), 480);
        assert_eq!(window.minutes_remaining(t("17:00")), 0);
        assert_eq!(window.minutes_remaining(t("18:00")), 0);
    }

    #[test]
    fn test_window_serde_uses_hh_mm() {
        let window: AccessWindow =
            serde_json::from_str(r#"{"start": "08:00", "end": "17:30"}"#).unwrap();
        assert_eq!(window, AccessWindow::new(t("08:00"), t("17:30")));
        assert_eq!(window.to_string(), "08:00-17:30");
    }
}
