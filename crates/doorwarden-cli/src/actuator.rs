//! Console stand-in for the lock, LEDs and display.

use doorwarden_hardware::{ActuatorCommand, DoorActuator, Indicator, Result};
use tracing::info;

/// Actuator that reports every output change through the log.
#[derive(Debug)]
pub struct TracingActuator {
    locked: bool,
    display: (String, String),
}

impl TracingActuator {
    pub fn new() -> Self {
        Self {
            locked: true,
            display: (String::new(), String::new()),
        }
    }
}

impl DoorActuator for TracingActuator {
    fn apply(&mut self, command: &ActuatorCommand) -> Result<()> {
        match command {
            ActuatorCommand::LockEngage | ActuatorCommand::LockRelease => {
                let locked = matches!(command, ActuatorCommand::LockEngage);
                if locked != self.locked {
                    self.locked = locked;
                    info!(target: "door", "{}", if locked { "LOCKED" } else { "UNLOCKED" });
                }
            }
            ActuatorCommand::Indicator { indicator, on } => {
                let led = match indicator {
                    Indicator::Grant => "green",
                    Indicator::Deny => "red",
                };
                info!(target: "door", "{} LED {}", led, if *on { "on" } else { "off" });
            }
            ActuatorCommand::DisplayText { line1, line2 } => {
                let next = (line1.clone(), line2.clone());
                if next != self.display {
                    info!(target: "door", "[{:<16}] [{:<16}]", line1, line2);
                    self.display = next;
                }
            }
        }
        Ok(())
    }
}
