use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Clock errors
    #[error("Clock unavailable: {reason}")]
    ClockUnavailable { reason: String },

    // Credential errors
    #[error("Invalid badge identifier: {0}")]
    InvalidBadgeId(String),

    // Schedule errors
    #[error("Invalid time of day: {0}")]
    InvalidTimeOfDay(String),

    // Directory errors
    #[error("User directory full: capacity is {capacity} entries")]
    DirectoryFull { capacity: usize },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),
}

impl Error {
    /// Create a clock unavailable error.
    pub fn clock_unavailable(reason: impl Into<String>) -> Self {
        Self::ClockUnavailable {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
