//! Hardware device trait definitions.
//!
//! These traits are the contract between the access controller and its
//! peripherals: the badge reader, the lock/indicator/display output, and the
//! clock. The controller runs a cooperative polling loop, so every method is
//! synchronous and must return promptly; a reader with nothing to report
//! returns `Ok(None)` instead of waiting.

use crate::error::Result;
use crate::types::ActuatorCommand;
use doorwarden_core::{BadgeId, Moment};

/// Badge reader abstraction.
///
/// # Examples
///
/// ```
/// use doorwarden_hardware::traits::BadgeReader;
/// use doorwarden_hardware::mock::MockBadgeReader;
/// use doorwarden_core::BadgeId;
///
/// let (mut reader, handle) = MockBadgeReader::new();
/// assert!(reader.poll_card().unwrap().is_none());
///
/// handle.try_present_serial([0x53, 0x62, 0x24, 0x39]).unwrap();
/// let badge = reader.poll_card().unwrap();
/// assert_eq!(badge, Some(BadgeId::new("53622439").unwrap()));
/// ```
pub trait BadgeReader: Send {
    /// Return the badge currently presented, if any.
    ///
    /// Each physical presentation is reported once; the reader halts the card
    /// after a successful read.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The reader is disconnected
    /// - The card serial could not be read
    fn poll_card(&mut self) -> Result<Option<BadgeId>>;
}

/// Lock, indicator LEDs and 2-line display.
pub trait DoorActuator: Send {
    /// Apply a single command.
    ///
    /// # Errors
    ///
    /// Returns an error if the output driver reports a failure.
    fn apply(&mut self, command: &ActuatorCommand) -> Result<()>;
}

/// Time source.
///
/// A reading carries both a monotonic tick value, used for unlock deadlines,
/// and the local wall-clock time, used for access windows and every
/// human-facing timestamp.
pub trait Clock: Send {
    fn now(&self) -> Moment;
}
