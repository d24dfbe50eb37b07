//! Display text for the two-line door panel.
//!
//! # Usage
//!
//! ```
//! use doorwarden_controller::messages::DisplayMessages;
//!
//! assert_eq!(DisplayMessages::master_timer(10), "10 min timer");
//! ```

/// Text shown on the door panel.
///
/// ASCII only; the panel driver has no extended character set.
pub struct DisplayMessages;

impl DisplayMessages {
    /// Idle screen, first line
    pub const IDLE_TITLE: &'static str = "Access Control";

    /// Idle screen, second line
    pub const IDLE_STATUS: &'static str = "System Ready";

    pub const ACCESS_GRANTED: &'static str = "Access Granted!";

    /// Shown above the occupant's name while the door is held
    pub const ROOM_OCCUPIED_BY: &'static str = "Room occupied by:";

    pub const MASTER_ACCESS: &'static str = "Master Access!";

    pub const DOOR_UNLOCKED: &'static str = "Door unlocked";

    pub const ACCESS_DENIED: &'static str = "Access Denied";

    /// Known badge presented outside its window
    pub const OUTSIDE_SCHEDULE: &'static str = "Outside schedule";

    /// Badge not registered
    pub const UNAUTHORIZED: &'static str = "Unauthorized";

    /// Denied because someone else holds the door
    pub const ROOM_OCCUPIED: &'static str = "Room occupied";

    pub const DOOR_LOCKED: &'static str = "Door Locked";

    /// Relock after a scheduled hold
    pub const SCHEDULE_ENDED: &'static str = "Schedule ended";

    /// Relock after a master hold
    pub const MASTER_TIMER_END: &'static str = "Master timer end";

    /// The wall clock could not be read at startup
    pub const RTC_ERROR: &'static str = "RTC Error!";

    /// Second line of the master grant screen.
    pub fn master_timer(minutes: u64) -> String {
        format!("{minutes} min timer")
    }

    /// Second line shown while a master hold is active.
    pub fn master_remaining(minutes: u64) -> String {
        format!("Master: {minutes} min")
    }
}
