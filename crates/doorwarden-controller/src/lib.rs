//! Control loop of the Doorwarden single-door access controller.
//!
//! Wires the decision engine and occupancy supervisor from
//! `doorwarden-access` to the peripherals of `doorwarden-hardware` and the
//! audit and notification sinks of `doorwarden-reporting`.

pub mod controller;
pub mod feedback;
pub mod messages;

pub use controller::{DoorController, Peripherals, StepOutcome, show_clock_error};
pub use feedback::{FeedbackPlan, FeedbackSequencer, FeedbackStep};
pub use messages::DisplayMessages;
