//! Mock door actuator recording every command it receives.

use crate::{
    HardwareError, Result,
    traits::DoorActuator,
    types::{ActuatorCommand, Indicator},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Output state reconstructed from the commands applied so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorSnapshot {
    pub locked: bool,
    pub grant_indicator: bool,
    pub deny_indicator: bool,
    pub line1: String,
    pub line2: String,
}

impl Default for ActuatorSnapshot {
    fn default() -> Self {
        Self {
            locked: true,
            grant_indicator: false,
            deny_indicator: false,
            line1: String::new(),
            line2: String::new(),
        }
    }
}

#[derive(Debug, Default)]
struct ActuatorLog {
    commands: Vec<ActuatorCommand>,
    snapshot: ActuatorSnapshot,
    failing: bool,
}

/// Mock door actuator for testing and development.
///
/// Starts locked with both indicators off and an empty display.
///
/// # Examples
///
/// ```
/// use doorwarden_hardware::mock::MockDoorActuator;
/// use doorwarden_hardware::traits::DoorActuator;
/// use doorwarden_hardware::ActuatorCommand;
///
/// let (mut actuator, handle) = MockDoorActuator::new();
///
/// actuator.apply(&ActuatorCommand::grant_indicator(true)).unwrap();
/// actuator.apply(&ActuatorCommand::display("Access Granted!", "Mr. Hans")).unwrap();
///
/// let state = handle.snapshot();
/// assert!(state.grant_indicator);
/// assert_eq!(state.line2, "Mr. Hans");
/// assert_eq!(handle.commands().len(), 2);
/// ```
#[derive(Debug)]
pub struct MockDoorActuator {
    log: Arc<Mutex<ActuatorLog>>,
}

impl MockDoorActuator {
    /// Create a new mock actuator and the handle used to inspect it.
    pub fn new() -> (Self, MockActuatorHandle) {
        let log = Arc::new(Mutex::new(ActuatorLog::default()));
        (
            Self { log: log.clone() },
            MockActuatorHandle { log },
        )
    }
}

impl DoorActuator for MockDoorActuator {
    fn apply(&mut self, command: &ActuatorCommand) -> Result<()> {
        let mut log = lock(&self.log);
        if log.failing {
            return Err(HardwareError::link(format!(
                "mock actuator rejected '{command}'"
            )));
        }

        match command {
            ActuatorCommand::LockEngage => log.snapshot.locked = true,
            ActuatorCommand::LockRelease => log.snapshot.locked = false,
            ActuatorCommand::Indicator {
                indicator: Indicator::Grant,
                on,
            } => log.snapshot.grant_indicator = *on,
            ActuatorCommand::Indicator {
                indicator: Indicator::Deny,
                on,
            } => log.snapshot.deny_indicator = *on,
            ActuatorCommand::DisplayText { line1, line2 } => {
                log.snapshot.line1.clone_from(line1);
                log.snapshot.line2.clone_from(line2);
            }
        }
        log.commands.push(command.clone());
        Ok(())
    }
}

/// Handle for inspecting a mock actuator.
#[derive(Debug, Clone)]
pub struct MockActuatorHandle {
    log: Arc<Mutex<ActuatorLog>>,
}

impl MockActuatorHandle {
    /// All commands applied so far, oldest first.
    pub fn commands(&self) -> Vec<ActuatorCommand> {
        lock(&self.log).commands.clone()
    }

    /// Forget recorded commands; the reconstructed state is kept.
    pub fn clear_commands(&self) {
        lock(&self.log).commands.clear();
    }

    /// Number of recorded commands equal to `command`.
    pub fn count(&self, command: &ActuatorCommand) -> usize {
        lock(&self.log)
            .commands
            .iter()
            .filter(|c| *c == command)
            .count()
    }

    /// Current reconstructed output state.
    pub fn snapshot(&self) -> ActuatorSnapshot {
        lock(&self.log).snapshot.clone()
    }

    pub fn is_locked(&self) -> bool {
        lock(&self.log).snapshot.locked
    }

    /// Current display lines.
    pub fn display(&self) -> (String, String) {
        let log = lock(&self.log);
        (log.snapshot.line1.clone(), log.snapshot.line2.clone())
    }

    /// Make every subsequent command fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        lock(&self.log).failing = failing;
    }
}

fn lock(log: &Mutex<ActuatorLog>) -> MutexGuard<'_, ActuatorLog> {
    log.lock().unwrap_or_else(PoisonError::into_inner)
}
