//! Notification message text.

use crate::format::{alert_date, clock_time};
use chrono::NaiveDateTime;
use doorwarden_access::{AccessEvent, Decision, GrantKind, Relock};
use std::fmt;

/// Sent once the controller has finished starting up.
pub const STARTUP_MESSAGE: &str = "Access Control System Started Successfully";

/// Subject used in alerts about badges nobody is registered for.
pub const UNKNOWN_USER: &str = "Unknown User";

/// Headline category of an access alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    AccessGranted,
    MasterAccessGranted,
    AccessDenied,
    UnauthorizedAttempt,
}

impl AlertKind {
    /// Categorize an access event.
    ///
    /// Any badge that is neither the master badge nor in the directory is an
    /// unauthorized attempt, even when the denial names the current occupant.
    pub fn for_event(event: &AccessEvent) -> Self {
        match (&event.decision, event.recognized) {
            (Decision::Granted(GrantKind::Master), _) => AlertKind::MasterAccessGranted,
            (Decision::Granted(GrantKind::Scheduled), _) => AlertKind::AccessGranted,
            (Decision::Denied(_), true) => AlertKind::AccessDenied,
            (Decision::Denied(_), false) => AlertKind::UnauthorizedAttempt,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            AlertKind::AccessGranted => "ACCESS GRANTED",
            AlertKind::MasterAccessGranted => "MASTER ACCESS GRANTED",
            AlertKind::AccessDenied => "ACCESS DENIED",
            AlertKind::UnauthorizedAttempt => "UNAUTHORIZED ACCESS ATTEMPT",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.headline())
    }
}

/// Build the alert sent for a badge presentation.
///
/// # Examples
///
/// ```
/// use doorwarden_access::{AccessEvent, Decision, DenialReason};
/// use doorwarden_core::BadgeId;
/// use doorwarden_reporting::alerts::access_alert;
/// use chrono::NaiveDate;
///
/// let event = AccessEvent {
///     badge_id: BadgeId::new("DEADBEEF").unwrap(),
///     subject_name: "Unauthorized".into(),
///     recognized: false,
///     decision: Decision::Denied(DenialReason::UnauthorizedBadge),
///     timestamp: NaiveDate::from_ymd_opt(2025, 5, 23).unwrap().and_hms_opt(14, 7, 0).unwrap(),
/// };
///
/// assert_eq!(
///     access_alert(&event),
///     "ACCESS ALERT\nUNAUTHORIZED ACCESS ATTEMPT\nUser: Unknown User\n\
///      Reason: unauthorized card\nTime: 2:07 PM\nDate: 5/23/2025\nCard UID: DEADBEEF"
/// );
/// ```
pub fn access_alert(event: &AccessEvent) -> String {
    let kind = AlertKind::for_event(event);
    let user = match kind {
        AlertKind::UnauthorizedAttempt => UNKNOWN_USER,
        _ => event.subject_name.as_str(),
    };

    let mut message = format!(
        "ACCESS ALERT\n{}\nUser: {}\nReason: {}\nTime: {}\nDate: {}",
        kind,
        user,
        event.reason(),
        clock_time(&event.timestamp),
        alert_date(&event.timestamp),
    );
    if kind == AlertKind::UnauthorizedAttempt {
        message.push_str("\nCard UID: ");
        message.push_str(event.badge_id.as_str());
    }
    message
}

/// Build the alert sent when a hold expires and the door relocks.
pub fn relock_alert(relock: &Relock, at: &NaiveDateTime) -> String {
    format!(
        "door locked: {}\nUser: {}\nTime: {}",
        relock.reason,
        relock.occupant,
        clock_time(at)
    )
}
