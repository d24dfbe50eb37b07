//! Access decisions and occupancy supervision for a single door.
//!
//! - [`UserDirectory`] and [`MasterProfile`] hold the static credentials.
//! - [`AccessEngine`] decides grant or deny for a presented badge.
//! - [`DoorState`] is the single occupancy record the controller owns.
//! - [`OccupancySupervisor`] relocks the door when a hold expires.
//!
//! Deadlines are computed on the monotonic reading of a
//! [`Moment`](doorwarden_core::Moment) while windows are checked against its
//! wall-clock reading, so changing the wall clock never moves a deadline.

pub mod decision;
pub mod directory;
pub mod door;
pub mod engine;
pub mod supervisor;

pub use decision::{AccessEvent, Decision, DenialReason, Evaluation, GrantKind};
pub use directory::{AccessProfile, MasterProfile, UserDirectory};
pub use door::{DoorState, Hold, HoldKind, Occupancy, OccupancyMode, StateMutation};
pub use engine::{AccessEngine, EnginePolicy};
pub use supervisor::{OccupancySupervisor, Relock, RelockReason};
