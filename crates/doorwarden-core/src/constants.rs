//! Core constants for the Doorwarden access controller.
//!
//! Values here are defaults and fixed formats shared by every crate in the
//! workspace. Anything an operator may tune is overridable through the
//! configuration file; the constants only supply the defaults.
//!
//! # Usage
//!
//! ```
//! use doorwarden_core::constants::*;
//!
//! assert_eq!(BADGE_ID_LENGTH, 8);
//! assert_eq!(DEFAULT_MASTER_GRANT_MINUTES, 10);
//! ```

// ============================================================================
// Badge Identifiers
// ============================================================================

/// Number of raw serial bytes read from a badge.
///
/// The reader exposes a 4-byte serial number; each byte becomes two hex digits.
pub const BADGE_SERIAL_BYTES: usize = 4;

/// Length of a normalized badge identifier (8 uppercase hex characters).
///
/// # Examples
///
/// ```
/// use doorwarden_core::constants::{BADGE_ID_LENGTH, BADGE_SERIAL_BYTES};
///
/// assert_eq!(BADGE_ID_LENGTH, BADGE_SERIAL_BYTES * 2);
/// ```
pub const BADGE_ID_LENGTH: usize = BADGE_SERIAL_BYTES * 2;

// ============================================================================
// Access Policy Defaults
// ============================================================================

/// Default duration of an elevated (master) hold, in minutes.
pub const DEFAULT_MASTER_GRANT_MINUTES: u64 = 10;

/// Longest configurable master hold, in minutes. Holds never span midnight
/// twice, so one day is the ceiling.
pub const MAX_MASTER_GRANT_MINUTES: u64 = MINUTES_PER_DAY as u64;

/// Default display name for the master credential.
pub const DEFAULT_MASTER_NAME: &str = "Master Key";

/// Maximum number of profiles the user directory accepts.
///
/// The directory is a bounded, statically-configured list. Loading more than
/// this many entries fails with [`Error::DirectoryFull`](crate::Error::DirectoryFull).
pub const MAX_DIRECTORY_ENTRIES: usize = 32;

/// Audit subject name recorded for badges that are not in the directory.
pub const UNAUTHORIZED_SUBJECT: &str = "Unauthorized";

// ============================================================================
// Notification Defaults
// ============================================================================

/// Default minimum interval between two notifications, in seconds.
///
/// Notification requests inside this window are dropped silently.
pub const DEFAULT_NOTIFICATION_COOLDOWN_SECS: u64 = 30;

// ============================================================================
// Time
// ============================================================================

/// Minutes in one day. Time-of-day values are always below this.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Earliest wall-clock year accepted at startup.
///
/// A wall clock reading before this year means the time source was never set
/// (for example an RTC that lost power), which makes every access window
/// meaningless.
pub const MIN_WALL_CLOCK_YEAR: i32 = 2020;
