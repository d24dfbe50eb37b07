//! Hardware device abstraction layer for the Doorwarden access controller.
//!
//! This crate defines the peripheral seams of the controller: the badge
//! reader, the door actuator (lock, indicator LEDs and display), and the
//! clock. Mock implementations drive tests and the simulation binary without
//! physical hardware.
//!
//! # Design Philosophy
//!
//! - **Non-blocking**: the controller runs a single-threaded polling loop, so
//!   every trait method returns immediately.
//! - **Thread-safe handles**: mocks come paired with cloneable handles that
//!   can be used from another task or thread.
//! - **Error-aware**: operations return [`Result<T>`][error::Result] with a
//!   [`HardwareError`] describing the failure.
//!
//! # Example
//!
//! ```
//! use doorwarden_hardware::mock::MockDoorActuator;
//! use doorwarden_hardware::traits::DoorActuator;
//! use doorwarden_hardware::ActuatorCommand;
//!
//! let (mut actuator, handle) = MockDoorActuator::new();
//! actuator.apply(&ActuatorCommand::LockRelease).unwrap();
//! assert!(!handle.is_locked());
//! ```

pub mod clock;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use clock::{SystemClock, check_wall_clock};
pub use error::{HardwareError, Result};
pub use traits::{BadgeReader, Clock, DoorActuator};
pub use types::{ActuatorCommand, Indicator};
