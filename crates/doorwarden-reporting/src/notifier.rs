//! Rate-limited, queued notification delivery.
//!
//! The control loop never waits on a transport. [`QueuedNotifier`] hands
//! messages to a bounded channel drained by a background task that owns the
//! [`SmsTransport`]. A full or closed queue drops the message.
//!
//! Rate limiting is separate: [`Cooldown`] decides from the time of the last
//! accepted message whether a new one may be sent at all.

use crate::sms::SmsTransport;
use doorwarden_core::{MonotonicTime, constants::DEFAULT_NOTIFICATION_COOLDOWN_SECS};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default depth of the delivery queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

/// Accepts messages for delivery to the administrator.
pub trait Notifier: Send {
    /// Submit a message without waiting for delivery.
    ///
    /// Returns `true` if the message was accepted for delivery.
    fn send(&mut self, message: String) -> bool;
}

/// Minimum interval between notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    interval: Duration,
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_NOTIFICATION_COOLDOWN_SECS))
    }
}

impl Cooldown {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check whether a message may be sent at `now`.
    ///
    /// Always allowed when nothing has been sent yet; otherwise allowed once
    /// the full interval has elapsed since `last`.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorwarden_core::MonotonicTime;
    /// use doorwarden_reporting::Cooldown;
    /// use std::time::Duration;
    ///
    /// let cooldown = Cooldown::new(Duration::from_secs(30));
    /// let last = Some(MonotonicTime::from_millis(1_000));
    ///
    /// assert!(cooldown.permits(None, MonotonicTime::ZERO));
    /// assert!(!cooldown.permits(last, MonotonicTime::from_millis(30_999)));
    /// assert!(cooldown.permits(last, MonotonicTime::from_millis(31_000)));
    /// ```
    pub fn permits(&self, last: Option<MonotonicTime>, now: MonotonicTime) -> bool {
        match last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }
}

/// Notifier backed by a bounded queue and a delivery task.
#[derive(Debug, Clone)]
pub struct QueuedNotifier {
    queue: mpsc::Sender<String>,
}

impl QueuedNotifier {
    /// Spawn the delivery task on the current tokio runtime.
    ///
    /// The task initializes `transport`, then delivers queued messages one at
    /// a time until every `QueuedNotifier` clone is dropped.
    pub fn spawn<T>(transport: T, capacity: usize) -> (Self, JoinHandle<()>)
    where
        T: SmsTransport + 'static,
    {
        let (queue, messages) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(dispatch(transport, messages));
        (Self { queue }, task)
    }
}

impl Notifier for QueuedNotifier {
    fn send(&mut self, message: String) -> bool {
        match self.queue.try_send(message) {
            Ok(()) => {
                debug!("Notification queued");
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!("Notification queue full, message dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Notification task stopped, message dropped");
                false
            }
        }
    }
}

async fn dispatch<T: SmsTransport>(mut transport: T, mut messages: mpsc::Receiver<String>) {
    if let Err(e) = transport.initialize().await {
        warn!("SMS transport initialization failed: {}", e);
    }

    while let Some(message) = messages.recv().await {
        if let Err(e) = transport.deliver(&message).await {
            warn!("SMS delivery failed: {}", e);
        }
    }
    info!("Notification queue closed, delivery task exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default)]
    struct RecordingTransport {
        delivered: Arc<Mutex<Vec<String>>>,
        delay: Duration,
    }

    impl SmsTransport for RecordingTransport {
        async fn initialize(&mut self) -> Result<()> {
            Ok(())
        }

        async fn deliver(&mut self, message: &str) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            self.delivered.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    #[rstest]
    #[case(None, 0, true)]
    #[case(Some(1_000), 1_000, false)]
    #[case(Some(1_000), 30_999, false)]
    #[case(Some(1_000), 31_000, true)]
    #[case(Some(50_000), 10_000, false)] // clock earlier than last send
    fn test_cooldown(#[case] last: Option<u64>, #[case] now: u64, #[case] expected: bool) {
        let cooldown = Cooldown::default();
        let last = last.map(MonotonicTime::from_millis);
        assert_eq!(cooldown.permits(last, MonotonicTime::from_millis(now)), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_messages_are_delivered_in_order() {
        let transport = RecordingTransport::default();
        let delivered = transport.delivered.clone();
        let (mut notifier, task) = QueuedNotifier::spawn(transport, 4);

        assert!(notifier.send("first".into()));
        assert!(notifier.send("second".into()));
        drop(notifier);
        task.await.unwrap();

        assert_eq!(*delivered.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_queue_drops_message() {
        let transport = RecordingTransport {
            delay: Duration::from_secs(10),
            ..Default::default()
        };
        let delivered = transport.delivered.clone();
        let (mut notifier, task) = QueuedNotifier::spawn(transport, 1);

        assert!(notifier.send("one".into()));
        assert!(!notifier.send("two".into()));

        drop(notifier);
        task.await.unwrap();
        assert_eq!(*delivered.lock().unwrap(), vec!["one"]);
    }

    #[tokio::test]
    async fn test_closed_queue_rejects() {
        let (mut notifier, task) = QueuedNotifier::spawn(RecordingTransport::default(), 1);
        task.abort();
        let _ = task.await;
        assert!(!notifier.send("late".into()));
    }
}
