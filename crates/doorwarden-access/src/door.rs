//! Occupancy state of the door.

use doorwarden_core::{BadgeId, MonotonicTime};
use std::fmt;

/// Which kind of grant is holding the door open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoldKind {
    /// A scheduled user, held until the end of their window.
    User,
    /// The master badge, held for the fixed elevated-access duration.
    Master,
}

/// An active hold: who opened the door and until when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hold {
    pub kind: HoldKind,
    pub badge_id: BadgeId,
    pub occupant: String,
    pub deadline: MonotonicTime,
}

/// Door occupancy.
///
/// The occupant and deadline only exist inside the held variant, so a free
/// door can never carry a stale occupant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Occupancy {
    #[default]
    Free,
    Held(Hold),
}

/// Flat view of [`Occupancy`] for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccupancyMode {
    Free,
    HeldByUser,
    HeldByMaster,
}

impl fmt::Display for OccupancyMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OccupancyMode::Free => write!(f, "free"),
            OccupancyMode::HeldByUser => write!(f, "held by user"),
            OccupancyMode::HeldByMaster => write!(f, "held by master"),
        }
    }
}

/// Change to the door produced by a grant.
///
/// Only the decision engine builds mutations; the controller applies them
/// with [`DoorState::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMutation {
    hold: Hold,
}

impl StateMutation {
    pub(crate) fn occupy(hold: Hold) -> Self {
        Self { hold }
    }

    /// The hold this mutation installs.
    pub fn hold(&self) -> &Hold {
        &self.hold
    }
}

/// The one door this controller guards.
///
/// Created free. Enters a held mode only through a [`StateMutation`] and
/// returns to free only through the occupancy supervisor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoorState {
    occupancy: Occupancy,
    last_notification: Option<MonotonicTime>,
}

impl DoorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    pub fn mode(&self) -> OccupancyMode {
        match &self.occupancy {
            Occupancy::Free => OccupancyMode::Free,
            Occupancy::Held(Hold {
                kind: HoldKind::User,
                ..
            }) => OccupancyMode::HeldByUser,
            Occupancy::Held(Hold {
                kind: HoldKind::Master,
                ..
            }) => OccupancyMode::HeldByMaster,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self.occupancy, Occupancy::Free)
    }

    /// The active hold, if any.
    pub fn hold(&self) -> Option<&Hold> {
        match &self.occupancy {
            Occupancy::Free => None,
            Occupancy::Held(hold) => Some(hold),
        }
    }

    pub fn occupant(&self) -> Option<&str> {
        self.hold().map(|hold| hold.occupant.as_str())
    }

    pub fn deadline(&self) -> Option<MonotonicTime> {
        self.hold().map(|hold| hold.deadline)
    }

    /// Install the hold carried by a grant, replacing any current one.
    pub fn apply(&mut self, mutation: StateMutation) {
        self.occupancy = Occupancy::Held(mutation.hold);
    }

    /// Return the door to free and hand back the hold that ended.
    pub(crate) fn release(&mut self) -> Option<Hold> {
        match std::mem::take(&mut self.occupancy) {
            Occupancy::Free => None,
            Occupancy::Held(hold) => Some(hold),
        }
    }

    /// Monotonic time of the last notification accepted for delivery.
    pub fn last_notification(&self) -> Option<MonotonicTime> {
        self.last_notification
    }

    pub fn record_notification(&mut self, at: MonotonicTime) {
        self.last_notification = Some(at);
    }
}
