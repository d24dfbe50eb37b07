//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring physical hardware. Each mock is
//! created together with a handle used to drive or inspect it.

pub mod actuator;
pub mod clock;
pub mod reader;

// Re-export commonly used types
pub use actuator::{ActuatorSnapshot, MockActuatorHandle, MockDoorActuator};
pub use clock::{MockClock, MockClockHandle};
pub use reader::{MockBadgeReader, MockBadgeReaderHandle};
