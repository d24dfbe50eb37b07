//! Audit trail and administrator notifications for the Doorwarden
//! access controller.
//!
//! - [`audit`]: PLX-DAQ or CSV lines, one per access event
//! - [`alerts`]: text of every SMS the controller sends
//! - [`notifier`]: cooldown and the queued delivery task
//! - [`sms`]: SIM800L AT-command transport and a logging fallback

pub mod alerts;
pub mod audit;
pub mod error;
pub mod format;
pub mod mock;
pub mod notifier;
pub mod sms;

pub use audit::{AuditFormat, AuditSink, WriterAuditSink};
pub use error::{ReportError, Result};
pub use notifier::{Cooldown, Notifier, QueuedNotifier};
pub use sms::{LogTransport, Sim800l, SmsTransport};
