//! Scheduled LED and display sequences.
//!
//! Every visible reaction to a badge or a relock is a [`FeedbackPlan`]: a
//! list of actuator commands at offsets from the moment the plan starts. The
//! [`FeedbackSequencer`] turns a plan into absolute steps and releases them
//! as the loop reaches each step time, so the loop never sleeps.
//!
//! Each plan sets both indicators at offset zero, so scheduling a new plan
//! over a pending one never leaves an LED lit.

use crate::messages::DisplayMessages;
use doorwarden_access::{Decision, DenialReason, GrantKind, RelockReason};
use doorwarden_core::MonotonicTime;
use doorwarden_hardware::ActuatorCommand;
use std::collections::VecDeque;
use std::time::Duration;

const INDICATOR_PULSE: Duration = Duration::from_secs(2);
const OCCUPANT_SCREEN_DELAY: Duration = Duration::from_secs(4);
const DENIAL_HOLD: Duration = Duration::from_secs(4);
const DENIAL_IDLE_DELAY: Duration = Duration::from_secs(6);
const RELOCK_IDLE_DELAY: Duration = Duration::from_secs(2);

/// Actuator commands at offsets from the start of the plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackPlan {
    steps: Vec<(Duration, ActuatorCommand)>,
}

impl FeedbackPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command to run `offset` after the plan starts.
    #[must_use]
    pub fn then(mut self, offset: Duration, command: ActuatorCommand) -> Self {
        self.steps.push((offset, command));
        self
    }

    pub fn steps(&self) -> &[(Duration, ActuatorCommand)] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Both LEDs off and the idle screen.
    pub fn idle() -> Self {
        Self::new()
            .then(Duration::ZERO, ActuatorCommand::grant_indicator(false))
            .then(Duration::ZERO, ActuatorCommand::deny_indicator(false))
            .then(Duration::ZERO, idle_screen())
    }

    /// Scheduled grant: unlock, green pulse, then the occupant screen.
    pub fn scheduled_grant(name: &str) -> Self {
        Self::new()
            .then(Duration::ZERO, ActuatorCommand::display(DisplayMessages::ACCESS_GRANTED, name))
            .then(Duration::ZERO, ActuatorCommand::deny_indicator(false))
            .then(Duration::ZERO, ActuatorCommand::grant_indicator(true))
            .then(Duration::ZERO, ActuatorCommand::LockRelease)
            .then(INDICATOR_PULSE, ActuatorCommand::grant_indicator(false))
            .then(
                OCCUPANT_SCREEN_DELAY,
                ActuatorCommand::display(DisplayMessages::ROOM_OCCUPIED_BY, name),
            )
    }

    /// Master grant: unlock, green pulse, then the timer screen.
    pub fn master_grant(minutes: u64) -> Self {
        Self::new()
            .then(
                Duration::ZERO,
                ActuatorCommand::display(
                    DisplayMessages::MASTER_ACCESS,
                    DisplayMessages::master_timer(minutes),
                ),
            )
            .then(Duration::ZERO, ActuatorCommand::deny_indicator(false))
            .then(Duration::ZERO, ActuatorCommand::grant_indicator(true))
            .then(Duration::ZERO, ActuatorCommand::LockRelease)
            .then(INDICATOR_PULSE, ActuatorCommand::grant_indicator(false))
            .then(
                INDICATOR_PULSE,
                ActuatorCommand::display(
                    DisplayMessages::DOOR_UNLOCKED,
                    DisplayMessages::master_remaining(minutes),
                ),
            )
    }

    /// Denial on a free door: red LED and lock engaged, then back to idle.
    pub fn denial(detail: &str) -> Self {
        Self::new()
            .then(Duration::ZERO, ActuatorCommand::display(DisplayMessages::ACCESS_DENIED, detail))
            .then(Duration::ZERO, ActuatorCommand::grant_indicator(false))
            .then(Duration::ZERO, ActuatorCommand::deny_indicator(true))
            .then(Duration::ZERO, ActuatorCommand::LockEngage)
            .then(DENIAL_HOLD, ActuatorCommand::deny_indicator(false))
            .then(DENIAL_HOLD, ActuatorCommand::display(DisplayMessages::DOOR_LOCKED, ""))
            .then(DENIAL_IDLE_DELAY, idle_screen())
    }

    /// Denial while the door is held: red pulse, then the occupant screen.
    ///
    /// The lock is left alone.
    pub fn occupied_denial(occupant: &str) -> Self {
        Self::new()
            .then(
                Duration::ZERO,
                ActuatorCommand::display(
                    DisplayMessages::ACCESS_DENIED,
                    DisplayMessages::ROOM_OCCUPIED,
                ),
            )
            .then(Duration::ZERO, ActuatorCommand::grant_indicator(false))
            .then(Duration::ZERO, ActuatorCommand::deny_indicator(true))
            .then(INDICATOR_PULSE, ActuatorCommand::deny_indicator(false))
            .then(
                INDICATOR_PULSE,
                ActuatorCommand::display(DisplayMessages::ROOM_OCCUPIED_BY, occupant),
            )
    }

    /// Relock after a hold ends, then back to idle.
    pub fn relock(reason: RelockReason) -> Self {
        let detail = match reason {
            RelockReason::ScheduleEnded => DisplayMessages::SCHEDULE_ENDED,
            RelockReason::MasterTimerExpired => DisplayMessages::MASTER_TIMER_END,
        };
        Self::new()
            .then(Duration::ZERO, ActuatorCommand::LockEngage)
            .then(Duration::ZERO, ActuatorCommand::grant_indicator(false))
            .then(Duration::ZERO, ActuatorCommand::deny_indicator(false))
            .then(Duration::ZERO, ActuatorCommand::display(DisplayMessages::DOOR_LOCKED, detail))
            .then(RELOCK_IDLE_DELAY, idle_screen())
    }

    /// The plan matching an access decision.
    ///
    /// `subject` is the name on the access event; `master_minutes` is the
    /// configured master hold.
    pub fn for_decision(decision: &Decision, subject: &str, master_minutes: u64) -> Self {
        match decision {
            Decision::Granted(GrantKind::Master) => Self::master_grant(master_minutes),
            Decision::Granted(GrantKind::Scheduled) => Self::scheduled_grant(subject),
            Decision::Denied(DenialReason::UnauthorizedBadge) => {
                Self::denial(DisplayMessages::UNAUTHORIZED)
            }
            Decision::Denied(DenialReason::OutsideWindow) => {
                Self::denial(DisplayMessages::OUTSIDE_SCHEDULE)
            }
            Decision::Denied(DenialReason::RoomOccupied { occupant }) => {
                Self::occupied_denial(occupant)
            }
        }
    }
}

fn idle_screen() -> ActuatorCommand {
    ActuatorCommand::display(DisplayMessages::IDLE_TITLE, DisplayMessages::IDLE_STATUS)
}

/// A command due at an absolute monotonic time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackStep {
    pub at: MonotonicTime,
    pub command: ActuatorCommand,
}

/// Holds the one pending plan and releases its steps when due.
#[derive(Debug, Clone, Default)]
pub struct FeedbackSequencer {
    pending: VecDeque<FeedbackStep>,
}

impl FeedbackSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `plan` at `now`, discarding whatever was still pending.
    pub fn schedule(&mut self, plan: FeedbackPlan, now: MonotonicTime) {
        let mut steps: Vec<_> = plan
            .steps
            .into_iter()
            .map(|(offset, command)| FeedbackStep {
                at: now + offset,
                command,
            })
            .collect();
        // Stable, so commands sharing an offset keep their order.
        steps.sort_by_key(|step| step.at);
        self.pending = steps.into();
    }

    /// Remove and return every command due at or before `now`, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorwarden_controller::feedback::{FeedbackPlan, FeedbackSequencer};
    /// use doorwarden_core::MonotonicTime;
    ///
    /// let mut sequencer = FeedbackSequencer::new();
    /// sequencer.schedule(FeedbackPlan::scheduled_grant("Mr. Hans"), MonotonicTime::ZERO);
    ///
    /// assert_eq!(sequencer.drain_due(MonotonicTime::ZERO).len(), 4);
    /// assert!(sequencer.drain_due(MonotonicTime::from_millis(1_999)).is_empty());
    /// assert_eq!(sequencer.drain_due(MonotonicTime::from_millis(2_000)).len(), 1);
    /// ```
    pub fn drain_due(&mut self, now: MonotonicTime) -> Vec<ActuatorCommand> {
        let mut due = Vec::new();
        while self.pending.front().is_some_and(|step| step.at <= now) {
            if let Some(step) = self.pending.pop_front() {
                due.push(step.command);
            }
        }
        due
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Steps still waiting.
    pub fn pending(&self) -> impl Iterator<Item = &FeedbackStep> {
        self.pending.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(ms: u64) -> MonotonicTime {
        MonotonicTime::from_millis(ms)
    }

    #[test]
    fn test_new_plan_replaces_pending() {
        let mut sequencer = FeedbackSequencer::new();
        sequencer.schedule(FeedbackPlan::scheduled_grant("Alice"), at(0));
        sequencer.drain_due(at(0));

        sequencer.schedule(FeedbackPlan::relock(RelockReason::ScheduleEnded), at(1_000));
        let immediate = sequencer.drain_due(at(1_000));
        assert_eq!(immediate[0], ActuatorCommand::LockEngage);

        // Nothing from the grant plan survives.
        let later = sequencer.drain_due(at(60_000));
        assert_eq!(later, vec![idle_screen()]);
        assert!(sequencer.is_idle());
    }

    #[test]
    fn test_denial_timeline() {
        let mut sequencer = FeedbackSequencer::new();
        sequencer.schedule(FeedbackPlan::denial(DisplayMessages::UNAUTHORIZED), at(100));

        let first = sequencer.drain_due(at(100));
        assert_eq!(
            first,
            vec![
                ActuatorCommand::display("Access Denied", "Unauthorized"),
                ActuatorCommand::grant_indicator(false),
                ActuatorCommand::deny_indicator(true),
                ActuatorCommand::LockEngage,
            ]
        );
        assert_eq!(
            sequencer.drain_due(at(4_100)),
            vec![
                ActuatorCommand::deny_indicator(false),
                ActuatorCommand::display("Door Locked", ""),
            ]
        );
        assert_eq!(sequencer.drain_due(at(6_100)), vec![idle_screen()]);
    }

    #[test]
    fn test_late_drain_releases_everything_in_order() {
        let mut sequencer = FeedbackSequencer::new();
        sequencer.schedule(FeedbackPlan::master_grant(10), at(0));

        let all = sequencer.drain_due(at(10_000));
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], ActuatorCommand::display("Master Access!", "10 min timer"));
        assert_eq!(all[5], ActuatorCommand::display("Door unlocked", "Master: 10 min"));
    }

    #[test]
    fn test_occupied_denial_leaves_lock_alone() {
        let plan = FeedbackPlan::occupied_denial("Mr. Hans");
        assert!(plan.steps().iter().all(|(_, c)| !c.is_lock_command()));
        assert_eq!(
            plan.steps().last().map(|(_, c)| c.clone()),
            Some(ActuatorCommand::display("Room occupied by:", "Mr. Hans"))
        );
    }

    #[rstest]
    #[case(FeedbackPlan::idle())]
    #[case(FeedbackPlan::scheduled_grant("Alice"))]
    #[case(FeedbackPlan::master_grant(10))]
    #[case(FeedbackPlan::denial("Outside schedule"))]
    #[case(FeedbackPlan::occupied_denial("Alice"))]
    #[case(FeedbackPlan::relock(RelockReason::MasterTimerExpired))]
    fn test_every_plan_sets_both_indicators_first(#[case] plan: FeedbackPlan) {
        let immediate: Vec<_> = plan
            .steps()
            .iter()
            .filter(|(offset, _)| offset.is_zero())
            .map(|(_, c)| c.clone())
            .collect();
        assert!(immediate.iter().any(|c| matches!(
            c,
            ActuatorCommand::Indicator { indicator: doorwarden_hardware::Indicator::Grant, .. }
        )));
        assert!(immediate.iter().any(|c| matches!(
            c,
            ActuatorCommand::Indicator { indicator: doorwarden_hardware::Indicator::Deny, .. }
        )));
    }

    #[rstest]
    #[case(Decision::Denied(DenialReason::OutsideWindow), FeedbackPlan::denial("Outside schedule"))]
    #[case(Decision::Denied(DenialReason::UnauthorizedBadge), FeedbackPlan::denial("Unauthorized"))]
    #[case(Decision::Granted(GrantKind::Master), FeedbackPlan::master_grant(10))]
    #[case(Decision::Granted(GrantKind::Scheduled), FeedbackPlan::scheduled_grant("Alice"))]
    fn test_plan_for_decision(#[case] decision: Decision, #[case] expected: FeedbackPlan) {
        assert_eq!(FeedbackPlan::for_decision(&decision, "Alice", 10), expected);
    }
}
