//! Peripheral failures raised by readers and actuators.

/// Result type alias for peripheral operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Failure reported by a badge reader or door actuator.
///
/// None of these are fatal to the controller; it logs them and keeps polling.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The peripheral can no longer be reached.
    #[error("{peripheral} is offline")]
    Offline { peripheral: String },

    /// The peripheral refused or dropped a request.
    #[error("peripheral link failed: {detail}")]
    Link { detail: String },

    /// A badge was in the field but its serial could not be read.
    #[error("badge read failed: {detail}")]
    BadgeRead { detail: String },

    /// The peripheral produced a serial that is not a valid badge id.
    #[error("malformed badge data: {detail}")]
    MalformedBadge { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    pub fn offline(peripheral: impl Into<String>) -> Self {
        Self::Offline {
            peripheral: peripheral.into(),
        }
    }

    pub fn link(detail: impl Into<String>) -> Self {
        Self::Link {
            detail: detail.into(),
        }
    }

    pub fn badge_read(detail: impl Into<String>) -> Self {
        Self::BadgeRead {
            detail: detail.into(),
        }
    }

    pub fn malformed_badge(detail: impl Into<String>) -> Self {
        Self::MalformedBadge {
            detail: detail.into(),
        }
    }
}

impl From<doorwarden_core::Error> for HardwareError {
    fn from(err: doorwarden_core::Error) -> Self {
        Self::malformed_badge(err.to_string())
    }
}
