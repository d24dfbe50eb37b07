//! In-memory notifier and audit sink for tests and dry runs.

use crate::{Result, audit::AuditSink, error::ReportError, notifier::Notifier};
use doorwarden_access::AccessEvent;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct NotifierLog {
    accepted: Vec<String>,
    attempts: usize,
    rejecting: bool,
}

/// Notifier that stores accepted messages in memory.
///
/// # Examples
///
/// ```
/// use doorwarden_reporting::Notifier;
/// use doorwarden_reporting::mock::MemoryNotifier;
///
/// let (mut notifier, handle) = MemoryNotifier::new();
/// assert!(notifier.send("hello".into()));
///
/// handle.set_rejecting(true);
/// assert!(!notifier.send("dropped".into()));
///
/// assert_eq!(handle.messages(), vec!["hello"]);
/// assert_eq!(handle.attempts(), 2);
/// ```
#[derive(Debug)]
pub struct MemoryNotifier {
    log: Arc<Mutex<NotifierLog>>,
}

impl MemoryNotifier {
    pub fn new() -> (Self, MemoryNotifierHandle) {
        let log = Arc::new(Mutex::new(NotifierLog::default()));
        (Self { log: log.clone() }, MemoryNotifierHandle { log })
    }
}

impl Notifier for MemoryNotifier {
    fn send(&mut self, message: String) -> bool {
        let mut log = lock(&self.log);
        log.attempts += 1;
        if log.rejecting {
            return false;
        }
        log.accepted.push(message);
        true
    }
}

/// Handle for inspecting a [`MemoryNotifier`].
#[derive(Debug, Clone)]
pub struct MemoryNotifierHandle {
    log: Arc<Mutex<NotifierLog>>,
}

impl MemoryNotifierHandle {
    /// Messages accepted so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        lock(&self.log).accepted.clone()
    }

    /// Number of `send` calls, accepted or not.
    pub fn attempts(&self) -> usize {
        lock(&self.log).attempts
    }

    /// Simulate a full or closed queue.
    pub fn set_rejecting(&self, rejecting: bool) {
        lock(&self.log).rejecting = rejecting;
    }
}

#[derive(Debug, Default)]
struct AuditLog {
    started: usize,
    events: Vec<AccessEvent>,
    failing: bool,
}

/// Audit sink that stores events in memory.
#[derive(Debug)]
pub struct MemoryAuditSink {
    log: Arc<Mutex<AuditLog>>,
}

impl MemoryAuditSink {
    pub fn new() -> (Self, MemoryAuditHandle) {
        let log = Arc::new(Mutex::new(AuditLog::default()));
        (Self { log: log.clone() }, MemoryAuditHandle { log })
    }
}

impl AuditSink for MemoryAuditSink {
    fn start(&mut self) -> Result<()> {
        lock(&self.log).started += 1;
        Ok(())
    }

    fn record(&mut self, event: &AccessEvent) -> Result<()> {
        let mut log = lock(&self.log);
        if log.failing {
            return Err(ReportError::Io(std::io::Error::other("audit sink unavailable")));
        }
        log.events.push(event.clone());
        Ok(())
    }
}

/// Handle for inspecting a [`MemoryAuditSink`].
#[derive(Debug, Clone)]
pub struct MemoryAuditHandle {
    log: Arc<Mutex<AuditLog>>,
}

impl MemoryAuditHandle {
    pub fn events(&self) -> Vec<AccessEvent> {
        lock(&self.log).events.clone()
    }

    /// Number of times the header was written.
    pub fn starts(&self) -> usize {
        lock(&self.log).started
    }

    pub fn set_failing(&self, failing: bool) {
        lock(&self.log).failing = failing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use doorwarden_access::{Decision, DenialReason};
    use doorwarden_core::BadgeId;

    fn event() -> AccessEvent {
        AccessEvent {
            badge_id: BadgeId::new("DEADBEEF").unwrap(),
            subject_name: "Unauthorized".into(),
            recognized: false,
            decision: Decision::Denied(DenialReason::UnauthorizedBadge),
            timestamp: NaiveDate::from_ymd_opt(2025, 5, 20)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_memory_audit_records() {
        let (mut sink, handle) = MemoryAuditSink::new();
        sink.start().unwrap();
        sink.record(&event()).unwrap();

        assert_eq!(handle.starts(), 1);
        assert_eq!(handle.events(), vec![event()]);
    }

    #[test]
    fn test_memory_audit_failure_mode() {
        let (mut sink, handle) = MemoryAuditSink::new();
        handle.set_failing(true);
        assert!(sink.record(&event()).is_err());
        assert!(handle.events().is_empty());
    }
}
