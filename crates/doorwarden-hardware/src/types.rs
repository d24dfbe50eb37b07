//! Commands accepted by the door actuator and indicator sink.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status indicator LEDs on the door panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Green LED, lit while a grant is being shown.
    Grant,

    /// Red LED, lit while a denial is being shown.
    Deny,
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grant => write!(f, "grant"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// Discrete command for the lock, the indicators or the 2-line display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ActuatorCommand {
    /// Engage the lock (door secured).
    LockEngage,

    /// Release the lock (door may be opened).
    LockRelease,

    /// Switch an indicator LED on or off.
    Indicator { indicator: Indicator, on: bool },

    /// Replace both display lines.
    DisplayText { line1: String, line2: String },
}

impl ActuatorCommand {
    /// Switch the grant (green) indicator.
    pub fn grant_indicator(on: bool) -> Self {
        Self::Indicator {
            indicator: Indicator::Grant,
            on,
        }
    }

    /// Switch the deny (red) indicator.
    pub fn deny_indicator(on: bool) -> Self {
        Self::Indicator {
            indicator: Indicator::Deny,
            on,
        }
    }

    /// Show two lines of text.
    pub fn display(line1: impl Into<String>, line2: impl Into<String>) -> Self {
        Self::DisplayText {
            line1: line1.into(),
            line2: line2.into(),
        }
    }

    /// Check if this command drives the lock.
    pub fn is_lock_command(&self) -> bool {
        matches!(self, Self::LockEngage | Self::LockRelease)
    }
}

impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockEngage => write!(f, "lock engage"),
            Self::LockRelease => write!(f, "lock release"),
            Self::Indicator { indicator, on } => {
                write!(f, "{} indicator {}", indicator, if *on { "on" } else { "off" })
            }
            Self::DisplayText { line1, line2 } => write!(f, "display [{line1}] [{line2}]"),
        }
    }
}
