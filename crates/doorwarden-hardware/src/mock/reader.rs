//! Mock badge reader implementation for testing and development.
//!
//! This module provides a simulated reader that can be fed programmatically,
//! from tests or from a simulation front end reading badge ids on stdin.

use crate::{HardwareError, Result, traits::BadgeReader};
use doorwarden_core::{BadgeId, constants::BADGE_SERIAL_BYTES};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Capacity of the pending-presentation queue.
const EVENT_QUEUE_CAPACITY: usize = 32;

/// Mock badge reader for testing and development.
///
/// Presentations queued through the [`MockBadgeReaderHandle`] are returned
/// one per [`poll_card`](BadgeReader::poll_card) call, in order.
///
/// # Examples
///
/// ```
/// use doorwarden_hardware::mock::MockBadgeReader;
/// use doorwarden_hardware::traits::BadgeReader;
///
/// #[tokio::main]
/// async fn main() -> doorwarden_hardware::Result<()> {
///     let (mut reader, handle) = MockBadgeReader::new();
///
///     handle.present_serial([0xAA, 0x11, 0xBB, 0x22]).await?;
///
///     let badge = reader.poll_card()?.unwrap();
///     assert_eq!(badge.as_str(), "AA11BB22");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockBadgeReader {
    /// Channel receiver for reader events
    event_rx: mpsc::Receiver<ReaderEvent>,

    /// Device name
    name: String,
}

impl MockBadgeReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockBadgeReader, MockBadgeReaderHandle) where the
    /// handle is used to simulate badge presentations.
    pub fn new() -> (Self, MockBadgeReaderHandle) {
        Self::with_name("Mock Badge Reader".to_string())
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: String) -> (Self, MockBadgeReaderHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

        let reader = Self {
            event_rx,
            name: name.clone(),
        };

        let handle = MockBadgeReaderHandle { event_tx, name };

        (reader, handle)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl BadgeReader for MockBadgeReader {
    fn poll_card(&mut self) -> Result<Option<BadgeId>> {
        match self.event_rx.try_recv() {
            Ok(ReaderEvent::Presented(badge)) => Ok(Some(badge)),
            Ok(ReaderEvent::ReadFailure(message)) => Err(HardwareError::badge_read(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(HardwareError::offline(self.name.clone())),
        }
    }
}

/// Internal event type for the mock reader.
#[derive(Debug, Clone)]
enum ReaderEvent {
    Presented(BadgeId),
    ReadFailure(String),
}

/// Handle for controlling a mock badge reader.
///
/// Handles are cheap to clone; every clone feeds the same reader.
#[derive(Debug, Clone)]
pub struct MockBadgeReaderHandle {
    /// Channel sender for reader events
    event_tx: mpsc::Sender<ReaderEvent>,

    /// Device name
    name: String,
}

impl MockBadgeReaderHandle {
    /// Present a badge to the reader, waiting for queue space if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present(&self, badge: BadgeId) -> Result<()> {
        self.event_tx
            .send(ReaderEvent::Presented(badge))
            .await
            .map_err(|_| HardwareError::offline(self.name.clone()))
    }

    /// Present a badge by its raw 4-byte serial number.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    pub async fn present_serial(&self, serial: [u8; BADGE_SERIAL_BYTES]) -> Result<()> {
        self.present(BadgeId::from_serial(serial)).await
    }

    /// Present a badge without waiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue is full or the reader has been dropped.
    pub fn try_present(&self, badge: BadgeId) -> Result<()> {
        self.try_send(ReaderEvent::Presented(badge))
    }

    /// Present a badge by raw serial without waiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue is full or the reader has been dropped.
    pub fn try_present_serial(&self, serial: [u8; BADGE_SERIAL_BYTES]) -> Result<()> {
        self.try_present(BadgeId::from_serial(serial))
    }

    /// Present a badge from a thread outside the async runtime, blocking
    /// until the queue has space.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader has been dropped.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async context.
    pub fn blocking_present(&self, badge: BadgeId) -> Result<()> {
        self.event_tx
            .blocking_send(ReaderEvent::Presented(badge))
            .map_err(|_| HardwareError::offline(self.name.clone()))
    }

    /// Make the next poll fail with a badge read error.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue is full or the reader has been dropped.
    pub fn inject_read_failure(&self, message: impl Into<String>) -> Result<()> {
        self.try_send(ReaderEvent::ReadFailure(message.into()))
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn try_send(&self, event: ReaderEvent) -> Result<()> {
        self.event_tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                HardwareError::link(format!("{}: presentation queue full", self.name))
            }
            mpsc::error::TrySendError::Closed(_) => {
                HardwareError::offline(self.name.clone())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_reader_present_and_poll() {
        let (mut reader, handle) = MockBadgeReader::new();

        handle
            .present(BadgeId::new("aa11bb22").unwrap())
            .await
            .unwrap();

        let badge = reader.poll_card().unwrap().unwrap();
        assert_eq!(badge.as_str(), "AA11BB22");

        // Each presentation is reported once
        assert!(reader.poll_card().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_reader_preserves_order() {
        let (mut reader, handle) = MockBadgeReader::new();

        handle.present_serial([0x01, 0x02, 0x03, 0x04]).await.unwrap();
        handle.present_serial([0x05, 0x06, 0x07, 0x08]).await.unwrap();

        assert_eq!(reader.poll_card().unwrap().unwrap().as_str(), "01020304");
        assert_eq!(reader.poll_card().unwrap().unwrap().as_str(), "05060708");
        assert!(reader.poll_card().unwrap().is_none());
    }

    #[test]
    fn test_mock_reader_blocking_present_from_thread() {
        let (mut reader, handle) = MockBadgeReader::new();

        std::thread::spawn(move || {
            handle
                .blocking_present(BadgeId::new("0a0b0c0d").unwrap())
                .unwrap();
        })
        .join()
        .unwrap();

        assert_eq!(reader.poll_card().unwrap().unwrap().as_str(), "0A0B0C0D");
        assert!(matches!(reader.poll_card(), Err(HardwareError::Offline { .. })));
    }

    #[test]
    fn test_mock_reader_read_failure() {
        let (mut reader, handle) = MockBadgeReader::new();

        handle.inject_read_failure("collision").unwrap();

        let result = reader.poll_card();
        assert!(matches!(result, Err(HardwareError::BadgeRead { .. })));
        assert!(reader.poll_card().unwrap().is_none());
    }

    #[test]
    fn test_mock_reader_disconnected_when_handles_dropped() {
        let (mut reader, handle) = MockBadgeReader::new();
        drop(handle);

        let result = reader.poll_card();
        assert!(matches!(result, Err(HardwareError::Offline { .. })));
    }

    #[test]
    fn test_mock_handle_reports_dropped_reader() {
        let (reader, handle) = MockBadgeReader::with_name("Front Door".to_string());
        assert_eq!(reader.name(), "Front Door");
        drop(reader);

        let result = handle.try_present_serial([0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(matches!(result, Err(HardwareError::Offline { .. })));
    }

    #[test]
    fn test_mock_handle_clone_feeds_same_reader() {
        let (mut reader, handle) = MockBadgeReader::new();
        let clone = handle.clone();

        handle.try_present_serial([0x11, 0x11, 0x11, 0x11]).unwrap();
        clone.try_present_serial([0x22, 0x22, 0x22, 0x22]).unwrap();

        assert_eq!(reader.poll_card().unwrap().unwrap().as_str(), "11111111");
        assert_eq!(reader.poll_card().unwrap().unwrap().as_str(), "22222222");
    }
}
