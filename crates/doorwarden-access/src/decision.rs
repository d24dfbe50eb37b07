//! Access decisions and the events they produce.

use crate::door::StateMutation;
use chrono::NaiveDateTime;
use doorwarden_core::BadgeId;
use std::fmt;

/// Why access was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantKind {
    Master,
    Scheduled,
}

/// Why access was refused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DenialReason {
    /// Badge is neither the master badge nor in the directory.
    UnauthorizedBadge,
    /// Known badge presented on a disallowed day or outside its window.
    OutsideWindow,
    /// Door is currently held by someone else.
    RoomOccupied { occupant: String },
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DenialReason::UnauthorizedBadge => write!(f, "unauthorized card"),
            DenialReason::OutsideWindow => write!(f, "outside scheduled hours"),
            DenialReason::RoomOccupied { occupant } => write!(f, "room occupied by {occupant}"),
        }
    }
}

/// Outcome of presenting a badge.
///
/// `Display` renders the reason recorded in audit rows and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Decision {
    Granted(GrantKind),
    Denied(DenialReason),
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted(_))
    }

    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Decision::Granted(GrantKind::Master) => write!(f, "master access granted"),
            Decision::Granted(GrantKind::Scheduled) => write!(f, "access granted"),
            Decision::Denied(reason) => write!(f, "{reason}"),
        }
    }
}

/// Record of one badge presentation, handed once to the audit sink and the
/// notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEvent {
    pub badge_id: BadgeId,
    /// Profile display name, or `"Unauthorized"` for unknown badges.
    pub subject_name: String,
    /// Whether the badge is the master badge or registered in the directory.
    pub recognized: bool,
    pub decision: Decision,
    /// Wall-clock time of the presentation.
    pub timestamp: NaiveDateTime,
}

impl AccessEvent {
    pub fn granted(&self) -> bool {
        self.decision.is_granted()
    }

    pub fn reason(&self) -> String {
        self.decision.reason()
    }
}

/// Full result of [`AccessEngine::evaluate`](crate::AccessEngine::evaluate).
///
/// `mutation` is `Some` exactly when the decision is a grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: Decision,
    pub mutation: Option<StateMutation>,
    pub event: AccessEvent,
}
