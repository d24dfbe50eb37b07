pub mod constants;
pub mod error;
pub mod schedule;
pub mod types;

pub use error::{Error, Result};
pub use schedule::{AccessWindow, TimeOfDay, WeekdaySet};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
