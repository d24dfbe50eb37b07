//! Timer-driven auto-relock.

use crate::door::{DoorState, HoldKind};
use doorwarden_core::{BadgeId, MonotonicTime};
use std::fmt;
use tracing::info;

/// Why a held door was relocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelockReason {
    /// A scheduled user's window closed.
    ScheduleEnded,
    /// The master hold ran out.
    MasterTimerExpired,
}

impl From<HoldKind> for RelockReason {
    fn from(kind: HoldKind) -> Self {
        match kind {
            HoldKind::User => RelockReason::ScheduleEnded,
            HoldKind::Master => RelockReason::MasterTimerExpired,
        }
    }
}

impl fmt::Display for RelockReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RelockReason::ScheduleEnded => write!(f, "schedule ended"),
            RelockReason::MasterTimerExpired => write!(f, "elevated-access timer expired"),
        }
    }
}

/// A hold that just ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relock {
    pub reason: RelockReason,
    pub badge_id: BadgeId,
    pub occupant: String,
    pub deadline: MonotonicTime,
    pub at: MonotonicTime,
}

/// Polled every loop iteration to relock the door once its hold expires.
#[derive(Debug, Clone, Copy, Default)]
pub struct OccupancySupervisor;

impl OccupancySupervisor {
    pub fn new() -> Self {
        Self
    }

    /// Relock the door if its deadline has strictly passed.
    ///
    /// Returns the ended hold when the door was freed. A free door and a
    /// door at exactly its deadline are left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorwarden_access::{DoorState, OccupancySupervisor};
    /// use doorwarden_core::MonotonicTime;
    ///
    /// let mut door = DoorState::new();
    /// let supervisor = OccupancySupervisor::new();
    /// assert!(supervisor.tick(&mut door, MonotonicTime::from_millis(1_000)).is_none());
    /// ```
    pub fn tick(&self, door: &mut DoorState, now: MonotonicTime) -> Option<Relock> {
        let deadline = door.deadline()?;
        if now <= deadline {
            return None;
        }

        let hold = door.release()?;
        let relock = Relock {
            reason: RelockReason::from(hold.kind),
            badge_id: hold.badge_id,
            occupant: hold.occupant,
            deadline: hold.deadline,
            at: now,
        };
        info!("door relocked ({}), occupant {}", relock.reason, relock.occupant);
        Some(relock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::door::{Hold, OccupancyMode, StateMutation};

    fn held(kind: HoldKind, deadline_ms: u64) -> DoorState {
        let mut door = DoorState::new();
        door.apply(StateMutation::occupy(Hold {
            kind,
            badge_id: BadgeId::new("AA11BB22").unwrap(),
            occupant: "Alice".to_string(),
            deadline: MonotonicTime::from_millis(deadline_ms),
        }));
        door
    }

    #[test]
    fn test_free_door_is_noop() {
        let mut door = DoorState::new();
        let relock =
            OccupancySupervisor::new().tick(&mut door, MonotonicTime::from_millis(u64::MAX));
        assert!(relock.is_none());
        assert!(door.is_free());
    }

    #[test]
    fn test_before_and_at_deadline_untouched() {
        let supervisor = OccupancySupervisor::new();
        let mut door = held(HoldKind::User, 10_000);
        let before = door.clone();

        assert!(supervisor.tick(&mut door, MonotonicTime::from_millis(9_999)).is_none());
        assert!(supervisor.tick(&mut door, MonotonicTime::from_millis(10_000)).is_none());
        assert_eq!(door, before);
    }

    #[test]
    fn test_relock_once_after_deadline() {
        let supervisor = OccupancySupervisor::new();
        let mut door = held(HoldKind::User, 10_000);

        let relock = supervisor
            .tick(&mut door, MonotonicTime::from_millis(10_001))
            .unwrap();
        assert_eq!(relock.reason, RelockReason::ScheduleEnded);
        assert_eq!(relock.occupant, "Alice");
        assert_eq!(door.mode(), OccupancyMode::Free);
        assert_eq!(door.occupant(), None);

        assert!(supervisor.tick(&mut door, MonotonicTime::from_millis(10_002)).is_none());
    }

    #[test]
    fn test_master_relock_reason() {
        let mut door = held(HoldKind::Master, 0);
        let relock = OccupancySupervisor::new()
            .tick(&mut door, MonotonicTime::from_millis(1))
            .unwrap();
        assert_eq!(relock.reason, RelockReason::MasterTimerExpired);
        assert_eq!(relock.reason.to_string(), "elevated-access timer expired");
    }
}
