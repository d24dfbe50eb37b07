//! Static user directory and the master profile.
//!
//! The directory is loaded once from configuration and never changes while
//! the controller runs. The master badge is held separately and is checked
//! before the directory.

use doorwarden_core::{
    AccessWindow, BadgeId, Error, Moment, Result, WeekdaySet,
    constants::{DEFAULT_MASTER_GRANT_MINUTES, DEFAULT_MASTER_NAME, MAX_DIRECTORY_ENTRIES},
};
use std::time::Duration;

/// Access profile of a regular badge holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessProfile {
    pub badge_id: BadgeId,
    pub display_name: String,
    pub allowed_days: WeekdaySet,
    pub window: AccessWindow,
}

impl AccessProfile {
    pub fn new(
        badge_id: BadgeId,
        display_name: impl Into<String>,
        allowed_days: WeekdaySet,
        window: AccessWindow,
    ) -> Self {
        Self {
            badge_id,
            display_name: display_name.into(),
            allowed_days,
            window,
        }
    }

    /// Check whether `now` falls on an allowed day and inside the window.
    ///
    /// Both window ends are inclusive at minute resolution, so a badge
    /// presented at 17:00:59 still matches a window ending at 17:00.
    #[must_use]
    pub fn is_within_window(&self, now: &Moment) -> bool {
        self.allowed_days.contains(now.weekday()) && self.window.contains(now.time_of_day())
    }
}

/// The single elevated-access profile.
///
/// Master access ignores days and windows and holds the door open for a
/// fixed duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterProfile {
    pub badge_id: BadgeId,
    pub display_name: String,
    pub grant_duration: Duration,
}

impl MasterProfile {
    pub fn new(
        badge_id: BadgeId,
        display_name: impl Into<String>,
        grant_duration: Duration,
    ) -> Self {
        Self {
            badge_id,
            display_name: display_name.into(),
            grant_duration,
        }
    }

    /// Master profile with the default name and grant duration.
    pub fn with_defaults(badge_id: BadgeId) -> Self {
        Self::new(
            badge_id,
            DEFAULT_MASTER_NAME,
            Duration::from_secs(DEFAULT_MASTER_GRANT_MINUTES * 60),
        )
    }

    /// Grant duration in whole minutes, as shown on the display.
    #[must_use]
    pub fn grant_minutes(&self) -> u64 {
        self.grant_duration.as_secs() / 60
    }
}

/// Bounded list of access profiles.
///
/// Badge ids must be unique and must not include the master badge. The
/// configuration loader enforces both; [`UserDirectory::lookup`] returns the
/// first match and does not re-check.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    profiles: Vec<AccessProfile>,
}

impl UserDirectory {
    /// Maximum number of profiles a directory holds.
    pub const CAPACITY: usize = MAX_DIRECTORY_ENTRIES;

    /// Build a directory from loaded profiles.
    ///
    /// # Errors
    ///
    /// Returns `Error::DirectoryFull` if more than [`Self::CAPACITY`]
    /// profiles are supplied.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorwarden_access::{AccessProfile, UserDirectory};
    /// use doorwarden_core::{AccessWindow, BadgeId, WeekdaySet};
    ///
    /// let hans = AccessProfile::new(
    ///     BadgeId::new("53622439").unwrap(),
    ///     "Mr. Hans",
    ///     WeekdaySet::WEEKDAYS,
    ///     AccessWindow::ALL_DAY,
    /// );
    /// let directory = UserDirectory::new(vec![hans]).unwrap();
    ///
    /// let found = directory.lookup(&BadgeId::new("53622439").unwrap());
    /// assert_eq!(found.map(|p| p.display_name.as_str()), Some("Mr. Hans"));
    /// ```
    pub fn new(profiles: Vec<AccessProfile>) -> Result<Self> {
        if profiles.len() > Self::CAPACITY {
            return Err(Error::DirectoryFull {
                capacity: Self::CAPACITY,
            });
        }
        Ok(Self { profiles })
    }

    /// Find the profile registered for `badge_id`.
    ///
    /// Every entry is compared so lookup time does not depend on where the
    /// badge sits in the list.
    #[must_use]
    pub fn lookup(&self, badge_id: &BadgeId) -> Option<&AccessProfile> {
        self.profiles
            .iter()
            .fold(None, |found, profile| match found {
                None if profile.badge_id == *badge_id => Some(profile),
                _ => found,
            })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessProfile> {
        self.profiles.iter()
    }
}
