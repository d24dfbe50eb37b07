//! Access decision engine.
//!
//! Turns a presented badge, the current time and the door state into a
//! decision, at most one state mutation and exactly one audit event. The
//! engine never touches the door itself; the controller applies the mutation.

use crate::{
    decision::{AccessEvent, Decision, DenialReason, Evaluation, GrantKind},
    directory::{AccessProfile, MasterProfile, UserDirectory},
    door::{DoorState, Hold, HoldKind, StateMutation},
};
use doorwarden_core::{BadgeId, Moment, constants::UNAUTHORIZED_SUBJECT};
use std::time::Duration;
use tracing::debug;

/// Tunable decision rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnginePolicy {
    /// Let a scheduled grant take over a door someone else is holding.
    ///
    /// When disabled, a scheduled user is refused while a different badge
    /// holds the door; the same badge re-presented refreshes its deadline.
    /// Master access is never refused.
    pub allow_reassign_while_held: bool,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            allow_reassign_while_held: true,
        }
    }
}

/// Access decision engine.
///
/// # Examples
///
/// ```
/// use doorwarden_access::{AccessEngine, Decision, DoorState, MasterProfile, UserDirectory};
/// use doorwarden_core::{BadgeId, Moment, MonotonicTime};
/// use chrono::NaiveDate;
///
/// let master = MasterProfile::with_defaults(BadgeId::new("C3A1F2B0").unwrap());
/// let engine = AccessEngine::new(master, UserDirectory::default());
///
/// let wall = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let now = Moment::new(MonotonicTime::ZERO, wall);
///
/// let result = engine.evaluate(&DoorState::new(), &BadgeId::new("DEADBEEF").unwrap(), &now);
/// assert!(!result.decision.is_granted());
/// assert_eq!(result.event.reason(), "unauthorized card");
/// assert_eq!(result.event.subject_name, "Unauthorized");
/// ```
#[derive(Debug, Clone)]
pub struct AccessEngine {
    master: MasterProfile,
    directory: UserDirectory,
    policy: EnginePolicy,
}

impl AccessEngine {
    /// Create an engine with the default policy.
    pub fn new(master: MasterProfile, directory: UserDirectory) -> Self {
        Self {
            master,
            directory,
            policy: EnginePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: EnginePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn master(&self) -> &MasterProfile {
        &self.master
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn policy(&self) -> EnginePolicy {
        self.policy
    }

    /// Decide what happens when `badge` is presented at `now`.
    ///
    /// Order of checks:
    /// 1. The master badge always grants and pre-empts any hold.
    /// 2. Unknown badges are denied.
    /// 3. Known badges outside their day/time window are denied.
    /// 4. Known badges inside their window are granted until the window
    ///    closes, subject to [`EnginePolicy::allow_reassign_while_held`].
    ///
    /// A denial while the door is held reports the current occupant instead
    /// of the underlying reason.
    pub fn evaluate(&self, door: &DoorState, badge: &BadgeId, now: &Moment) -> Evaluation {
        if *badge == self.master.badge_id {
            return self.grant_master(badge, now);
        }

        let Some(profile) = self.directory.lookup(badge) else {
            let reason = occupied_or(door, DenialReason::UnauthorizedBadge);
            return deny(badge, None, reason, now);
        };

        if !profile.is_within_window(now) {
            let reason = occupied_or(door, DenialReason::OutsideWindow);
            return deny(badge, Some(&profile.display_name), reason, now);
        }

        if !self.policy.allow_reassign_while_held {
            if let Some(hold) = door.hold().filter(|hold| hold.badge_id != *badge) {
                let reason = DenialReason::RoomOccupied {
                    occupant: hold.occupant.clone(),
                };
                return deny(badge, Some(&profile.display_name), reason, now);
            }
        }

        self.grant_scheduled(profile, now)
    }

    fn grant_master(&self, badge: &BadgeId, now: &Moment) -> Evaluation {
        let hold = Hold {
            kind: HoldKind::Master,
            badge_id: badge.clone(),
            occupant: self.master.display_name.clone(),
            deadline: now.monotonic + self.master.grant_duration,
        };
        debug!(
            "master grant for {} until {}",
            self.master.display_name, hold.deadline
        );
        grant(GrantKind::Master, hold, now)
    }

    fn grant_scheduled(&self, profile: &AccessProfile, now: &Moment) -> Evaluation {
        let remaining = profile.window.minutes_remaining(now.time_of_day());
        let hold = Hold {
            kind: HoldKind::User,
            badge_id: profile.badge_id.clone(),
            occupant: profile.display_name.clone(),
            deadline: now.monotonic + Duration::from_secs(u64::from(remaining) * 60),
        };
        debug!(
            "scheduled grant for {} with {} min remaining",
            profile.display_name, remaining
        );
        grant(GrantKind::Scheduled, hold, now)
    }
}

fn occupied_or(door: &DoorState, reason: DenialReason) -> DenialReason {
    match door.occupant() {
        Some(occupant) => DenialReason::RoomOccupied {
            occupant: occupant.to_string(),
        },
        None => reason,
    }
}

fn grant(kind: GrantKind, hold: Hold, now: &Moment) -> Evaluation {
    let decision = Decision::Granted(kind);
    let event = AccessEvent {
        badge_id: hold.badge_id.clone(),
        subject_name: hold.occupant.clone(),
        recognized: true,
        decision: decision.clone(),
        timestamp: now.wall,
    };
    Evaluation {
        decision,
        mutation: Some(StateMutation::occupy(hold)),
        event,
    }
}

fn deny(badge: &BadgeId, subject: Option<&str>, reason: DenialReason, now: &Moment) -> Evaluation {
    debug!("denied {}: {}", badge, reason);
    let decision = Decision::Denied(reason);
    let event = AccessEvent {
        badge_id: badge.clone(),
        subject_name: subject.unwrap_or(UNAUTHORIZED_SUBJECT).to_string(),
        recognized: subject.is_some(),
        decision: decision.clone(),
        timestamp: now.wall,
    };
    Evaluation {
        decision,
        mutation: None,
        event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::door::OccupancyMode;
    use chrono::{NaiveDate, Weekday};
    use doorwarden_core::{AccessWindow, MonotonicTime, TimeOfDay, WeekdaySet};
    use rstest::rstest;

    const MASTER: &str = "C3A1F2B0";
    const ALICE: &str = "AA11BB22";
    const HANS: &str = "53622439";

    fn badge(id: &str) -> BadgeId {
        BadgeId::new(id).unwrap()
    }

    fn window(start: (u8, u8), end: (u8, u8)) -> AccessWindow {
        AccessWindow::new(
            TimeOfDay::new(start.0, start.1).unwrap(),
            TimeOfDay::new(end.0, end.1).unwrap(),
        )
    }

    fn engine() -> AccessEngine {
        let directory = UserDirectory::new(vec![
            AccessProfile::new(
                badge(ALICE),
                "Alice",
                WeekdaySet::WEEKDAYS,
                window((8, 0), (17, 0)),
            ),
            AccessProfile::new(
                badge(HANS),
                "Mr. Hans",
                WeekdaySet::from_days([Weekday::Tue, Weekday::Sat]),
                window((6, 0), (22, 0)),
            ),
        ])
        .unwrap();
        AccessEngine::new(MasterProfile::with_defaults(badge(MASTER)), directory)
    }

    // 2025-05-20 is a Tuesday, 2025-05-24 a Saturday.
    fn at(day: u32, hour: u32, minute: u32, tick_ms: u64) -> Moment {
        let wall = NaiveDate::from_ymd_opt(2025, 5, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        Moment::new(MonotonicTime::from_millis(tick_ms), wall)
    }

    fn held_by(engine: &AccessEngine, id: &str, now: &Moment) -> DoorState {
        let mut door = DoorState::new();
        let result = engine.evaluate(&door, &badge(id), now);
        door.apply(result.mutation.unwrap());
        door
    }

    #[test]
    fn test_scheduled_grant_deadline() {
        let now = at(20, 9, 0, 1_000);
        let result = engine().evaluate(&DoorState::new(), &badge(ALICE), &now);

        assert_eq!(result.decision, Decision::Granted(GrantKind::Scheduled));
        assert_eq!(result.event.reason(), "access granted");
        assert_eq!(result.event.subject_name, "Alice");

        let hold = result.mutation.unwrap().hold().clone();
        assert_eq!(hold.kind, HoldKind::User);
        assert_eq!(hold.occupant, "Alice");
        assert_eq!(hold.deadline, now.monotonic + Duration::from_secs(480 * 60));
    }

    #[test]
    fn test_grant_at_closing_minute_has_zero_remaining() {
        let now = at(20, 17, 0, 5_000);
        let result = engine().evaluate(&DoorState::new(), &badge(ALICE), &now);
        assert!(result.decision.is_granted());
        assert_eq!(result.mutation.unwrap().hold().deadline, now.monotonic);
    }

    #[rstest]
    #[case(at(24, 9, 0, 0))] // Saturday
    #[case(at(20, 7, 59, 0))]
    #[case(at(20, 17, 1, 0))]
    fn test_outside_window_denied(#[case] now: Moment) {
        let result = engine().evaluate(&DoorState::new(), &badge(ALICE), &now);
        assert_eq!(result.decision, Decision::Denied(DenialReason::OutsideWindow));
        assert!(result.mutation.is_none());
        assert_eq!(result.event.reason(), "outside scheduled hours");
        assert_eq!(result.event.subject_name, "Alice");
    }

    #[test]
    fn test_unknown_badge_denied() {
        let result = engine().evaluate(&DoorState::new(), &badge("DEADBEEF"), &at(20, 9, 0, 0));
        assert_eq!(result.decision, Decision::Denied(DenialReason::UnauthorizedBadge));
        assert!(result.mutation.is_none());
        assert_eq!(result.event.subject_name, UNAUTHORIZED_SUBJECT);
        assert!(!result.event.recognized);
        assert_eq!(result.event.badge_id, badge("DEADBEEF"));
    }

    #[test]
    fn test_denials_report_occupant_while_held() {
        let engine = engine();
        let door = held_by(&engine, HANS, &at(20, 9, 0, 0));

        let unknown = engine.evaluate(&door, &badge("DEADBEEF"), &at(20, 9, 5, 300_000));
        assert_eq!(unknown.event.reason(), "room occupied by Mr. Hans");
        assert_eq!(unknown.event.subject_name, UNAUTHORIZED_SUBJECT);

        let outside = engine.evaluate(&door, &badge(ALICE), &at(20, 18, 0, 400_000));
        assert_eq!(outside.event.reason(), "room occupied by Mr. Hans");
        assert_eq!(outside.event.subject_name, "Alice");
    }

    #[test]
    fn test_master_always_grants() {
        let engine = engine();
        let now = at(24, 3, 0, 7_000);
        let result = engine.evaluate(&DoorState::new(), &badge(MASTER), &now);

        assert_eq!(result.decision, Decision::Granted(GrantKind::Master));
        assert_eq!(result.event.reason(), "master access granted");
        let hold = result.mutation.unwrap().hold().clone();
        assert_eq!(hold.kind, HoldKind::Master);
        assert_eq!(hold.occupant, engine.master().display_name);
        assert_eq!(hold.deadline, now.monotonic + engine.master().grant_duration);
    }

    #[test]
    fn test_master_preempts_user_hold() {
        let engine = engine();
        let mut door = held_by(&engine, ALICE, &at(20, 9, 0, 0));
        let user_deadline = door.deadline();

        let now = at(20, 9, 30, 1_800_000);
        let result = engine.evaluate(&door, &badge(MASTER), &now);
        door.apply(result.mutation.unwrap());

        assert_eq!(door.mode(), OccupancyMode::HeldByMaster);
        assert_ne!(door.deadline(), user_deadline);
        assert_eq!(door.deadline(), Some(now.monotonic + Duration::from_secs(600)));
    }

    #[test]
    fn test_reassign_allowed_by_default() {
        let engine = engine();
        let door = held_by(&engine, HANS, &at(20, 9, 0, 0));

        let result = engine.evaluate(&door, &badge(ALICE), &at(20, 9, 10, 600_000));
        assert!(result.decision.is_granted());
        assert_eq!(result.mutation.unwrap().hold().occupant, "Alice");
    }

    #[test]
    fn test_reassign_refused_when_disabled() {
        let engine = engine().with_policy(EnginePolicy {
            allow_reassign_while_held: false,
        });
        let door = held_by(&engine, HANS, &at(20, 9, 0, 0));

        let result = engine.evaluate(&door, &badge(ALICE), &at(20, 9, 10, 600_000));
        assert_eq!(
            result.decision,
            Decision::Denied(DenialReason::RoomOccupied {
                occupant: "Mr. Hans".into()
            })
        );
        assert!(result.mutation.is_none());
    }

    #[test]
    fn test_same_occupant_refreshes_when_reassign_disabled() {
        let engine = engine().with_policy(EnginePolicy {
            allow_reassign_while_held: false,
        });
        let door = held_by(&engine, HANS, &at(20, 9, 0, 0));

        let now = at(20, 10, 0, 3_600_000);
        let result = engine.evaluate(&door, &badge(HANS), &now);
        assert!(result.decision.is_granted());
        assert_eq!(
            result.mutation.unwrap().hold().deadline,
            now.monotonic + Duration::from_secs(12 * 3600)
        );
    }

    #[test]
    fn test_master_hold_blocks_user_when_reassign_disabled() {
        let engine = engine().with_policy(EnginePolicy {
            allow_reassign_while_held: false,
        });
        let door = held_by(&engine, MASTER, &at(20, 9, 0, 0));

        let result = engine.evaluate(&door, &badge(ALICE), &at(20, 9, 1, 60_000));
        assert_eq!(result.event.reason(), "room occupied by Master Key");

        let again = engine.evaluate(&door, &badge(MASTER), &at(20, 9, 2, 120_000));
        assert!(again.decision.is_granted());
    }
}
