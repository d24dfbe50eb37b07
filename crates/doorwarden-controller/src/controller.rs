//! The door control loop.
//!
//! [`DoorController`] is the one context object that owns the door state,
//! the decision engine, the supervisor and every collaborator. Each call to
//! [`DoorController::step`] runs one loop iteration:
//!
//! ```text
//! poll reader ──> evaluate ──> apply mutation ──> feedback plan
//!                                  │                audit record
//!                                  │                notification
//! tick supervisor ──> relock ──> feedback plan, notification
//! drain due feedback steps ──> actuator
//! ```
//!
//! Peripheral, audit and notifier failures are logged and never stop the
//! loop.

use crate::feedback::{FeedbackPlan, FeedbackSequencer};
use crate::messages::DisplayMessages;
use doorwarden_access::{AccessEngine, DoorState, Evaluation, OccupancySupervisor, Relock};
use doorwarden_core::{BadgeId, Moment, MonotonicTime};
use doorwarden_hardware::{ActuatorCommand, BadgeReader, Clock, DoorActuator};
use doorwarden_reporting::{
    AuditSink, Cooldown, Notifier,
    alerts::{STARTUP_MESSAGE, access_alert, relock_alert},
};
use tracing::{debug, error, info, warn};

/// Show the clock failure screen.
///
/// Used before a controller exists, when the wall clock cannot be read at
/// startup.
pub fn show_clock_error<A: DoorActuator>(actuator: &mut A) {
    let command = ActuatorCommand::display(DisplayMessages::RTC_ERROR, "");
    if let Err(e) = actuator.apply(&command) {
        error!("Failed to show clock error: {}", e);
    }
}

/// External collaborators of the controller.
#[derive(Debug)]
pub struct Peripherals<R, A, C, N, S> {
    pub reader: R,
    pub actuator: A,
    pub clock: C,
    pub notifier: N,
    pub audit: S,
}

/// What happened during one loop iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub evaluation: Option<Evaluation>,
    pub relock: Option<Relock>,
    /// Actuator commands issued this iteration, in order.
    pub commands: Vec<ActuatorCommand>,
    /// The reader started failing this iteration and a warning was logged.
    pub reader_fault_reported: bool,
}

/// Single-door access controller.
#[derive(Debug)]
pub struct DoorController<R, A, C, N, S> {
    engine: AccessEngine,
    supervisor: OccupancySupervisor,
    cooldown: Cooldown,
    door: DoorState,
    feedback: FeedbackSequencer,
    peripherals: Peripherals<R, A, C, N, S>,
    reader_faulted: bool,
}

impl<R, A, C, N, S> DoorController<R, A, C, N, S>
where
    R: BadgeReader,
    A: DoorActuator,
    C: Clock,
    N: Notifier,
    S: AuditSink,
{
    pub fn new(
        engine: AccessEngine,
        cooldown: Cooldown,
        peripherals: Peripherals<R, A, C, N, S>,
    ) -> Self {
        Self {
            engine,
            supervisor: OccupancySupervisor::new(),
            cooldown,
            door: DoorState::new(),
            feedback: FeedbackSequencer::new(),
            peripherals,
            reader_faulted: false,
        }
    }

    pub fn door(&self) -> &DoorState {
        &self.door
    }

    pub fn engine(&self) -> &AccessEngine {
        &self.engine
    }

    pub fn feedback(&self) -> &FeedbackSequencer {
        &self.feedback
    }

    pub fn peripherals(&self) -> &Peripherals<R, A, C, N, S> {
        &self.peripherals
    }

    /// Whether the last reader poll failed.
    pub fn reader_faulted(&self) -> bool {
        self.reader_faulted
    }

    /// Bring outputs to the locked, idle state and announce startup.
    ///
    /// Engages the lock, turns both LEDs off, shows the idle screen, writes
    /// the audit header and queues the startup notification.
    pub fn start(&mut self) {
        let now = self.peripherals.clock.now();

        self.actuate(&ActuatorCommand::LockEngage);
        for command in FeedbackPlan::idle().steps().iter().map(|(_, c)| c.clone()) {
            self.actuate(&command);
        }

        if let Err(e) = self.peripherals.audit.start() {
            error!("Failed to write audit header: {}", e);
        }

        info!(
            "Access control ready: master {} ({} min), {} users, reassign while held: {}",
            self.engine.master().badge_id,
            self.engine.master().grant_minutes(),
            self.engine.directory().len(),
            self.engine.policy().allow_reassign_while_held
        );
        self.notify(STARTUP_MESSAGE.to_string(), now.monotonic);
    }

    /// Run one loop iteration.
    pub fn step(&mut self) -> StepOutcome {
        let now = self.peripherals.clock.now();
        let mut outcome = StepOutcome::default();

        match self.peripherals.reader.poll_card() {
            Ok(polled) => {
                if self.reader_faulted {
                    info!("Badge reader recovered");
                    self.reader_faulted = false;
                }
                if let Some(badge) = polled {
                    outcome.evaluation = Some(self.handle_badge(&badge, &now));
                }
            }
            // A persistent fault is reported once, not on every poll.
            Err(e) if self.reader_faulted => debug!("Badge reader still failing: {}", e),
            Err(e) => {
                warn!("Badge reader error: {}", e);
                self.reader_faulted = true;
                outcome.reader_fault_reported = true;
            }
        }

        if let Some(relock) = self.supervisor.tick(&mut self.door, now.monotonic) {
            self.handle_relock(&relock, &now);
            outcome.relock = Some(relock);
        }

        for command in self.feedback.drain_due(now.monotonic) {
            self.actuate(&command);
            outcome.commands.push(command);
        }
        outcome
    }

    fn handle_badge(&mut self, badge: &BadgeId, now: &Moment) -> Evaluation {
        info!("Card: {}", badge);
        let evaluation = self.engine.evaluate(&self.door, badge, now);

        if let Some(mutation) = evaluation.mutation.clone() {
            self.door.apply(mutation);
        }

        let plan = FeedbackPlan::for_decision(
            &evaluation.decision,
            &evaluation.event.subject_name,
            self.engine.master().grant_minutes(),
        );
        self.feedback.schedule(plan, now.monotonic);

        let event = &evaluation.event;
        info!(
            "{} {} ({}): {}; door {}",
            if event.granted() { "Granted" } else { "Denied" },
            event.badge_id,
            event.subject_name,
            event.reason(),
            self.door.mode()
        );

        if let Err(e) = self.peripherals.audit.record(event) {
            error!("Failed to write audit record: {}", e);
        }
        self.notify(access_alert(event), now.monotonic);

        evaluation
    }

    fn handle_relock(&mut self, relock: &Relock, now: &Moment) {
        self.feedback
            .schedule(FeedbackPlan::relock(relock.reason), now.monotonic);
        self.notify(relock_alert(relock, &now.wall), now.monotonic);
    }

    /// Queue a notification unless the cooldown has not elapsed.
    fn notify(&mut self, message: String, now: MonotonicTime) -> bool {
        if !self.cooldown.permits(self.door.last_notification(), now) {
            debug!("Notification suppressed by cooldown");
            return false;
        }
        let accepted = self.peripherals.notifier.send(message);
        if accepted {
            self.door.record_notification(now);
        }
        accepted
    }

    fn actuate(&mut self, command: &ActuatorCommand) {
        debug!("Actuator: {}", command);
        if let Err(e) = self.peripherals.actuator.apply(command) {
            warn!("Actuator error on '{}': {}", command, e);
        }
    }
}
