//! SMS delivery transports.
//!
//! [`Sim800l`] drives a SIM800L GSM modem with text-mode AT commands over any
//! byte sink, normally a serial port from [`open_serial`]. The modem gives no
//! usable acknowledgement on the write-only wiring this controller uses, so
//! every step is followed by a fixed settle delay. The delays are async
//! sleeps and only ever run inside the notifier's delivery task.

use crate::Result;
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

/// Ctrl-Z, terminates the message body after `AT+CMGS`.
const SUBMIT: u8 = 0x1A;

const INIT_COMMANDS: [&str; 3] = ["AT", "AT+CMGF=1", "AT+CLIP=1"];

/// Something that can deliver a text message to the administrator.
///
/// **NOTE**: methods return `impl Future + Send` so a transport can be moved
/// into a spawned delivery task.
pub trait SmsTransport: Send {
    /// Prepare the transport. Called once before the first delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be written to.
    fn initialize(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be written to.
    fn deliver(&mut self, message: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Settle delays between modem steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sim800lTiming {
    /// After each initialization command and after `AT+CMGS`.
    pub command_delay: Duration,
    /// After the message body, before Ctrl-Z.
    pub body_delay: Duration,
    /// After Ctrl-Z, while the modem transmits.
    pub submit_delay: Duration,
}

impl Default for Sim800lTiming {
    fn default() -> Self {
        Self {
            command_delay: Duration::from_secs(1),
            body_delay: Duration::from_millis(100),
            submit_delay: Duration::from_secs(5),
        }
    }
}

/// SIM800L modem speaking text-mode AT commands.
///
/// # Examples
///
/// ```
/// use doorwarden_reporting::sms::{Sim800l, SmsTransport};
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let mut modem = Sim800l::new(Vec::new(), "+15550100");
/// modem.deliver("hello").await.unwrap();
///
/// let written = String::from_utf8(modem.into_inner()).unwrap();
/// assert_eq!(written, "AT+CMGS=\"+15550100\"\r\nhello\u{1a}");
/// # }
/// ```
#[derive(Debug)]
pub struct Sim800l<W> {
    port: W,
    phone: String,
    timing: Sim800lTiming,
}

impl<W: Write + Send> Sim800l<W> {
    pub fn new(port: W, phone: impl Into<String>) -> Self {
        Self {
            port,
            phone: phone.into(),
            timing: Sim800lTiming::default(),
        }
    }

    #[must_use]
    pub fn with_timing(mut self, timing: Sim800lTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn into_inner(self) -> W {
        self.port
    }

    fn command(&mut self, command: &str) -> Result<()> {
        debug!("SIM800L <- {}", command);
        write!(self.port, "{command}\r\n")?;
        self.port.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> SmsTransport for Sim800l<W> {
    async fn initialize(&mut self) -> Result<()> {
        for command in INIT_COMMANDS {
            self.command(command)?;
            tokio::time::sleep(self.timing.command_delay).await;
        }
        info!("SIM800L initialized");
        Ok(())
    }

    async fn deliver(&mut self, message: &str) -> Result<()> {
        let recipient = format!("AT+CMGS=\"{}\"", self.phone);
        self.command(&recipient)?;
        tokio::time::sleep(self.timing.command_delay).await;

        self.port.write_all(message.as_bytes())?;
        self.port.flush()?;
        tokio::time::sleep(self.timing.body_delay).await;

        self.port.write_all(&[SUBMIT])?;
        self.port.flush()?;
        tokio::time::sleep(self.timing.submit_delay).await;

        info!("SMS sent to {}", self.phone);
        Ok(())
    }
}

/// Open the modem's serial port.
///
/// # Errors
///
/// Returns `ReportError::Serial` if the port cannot be opened.
pub fn open_serial(path: &str, baud_rate: u32) -> Result<Box<dyn serialport::SerialPort>> {
    let port = serialport::new(path, baud_rate)
        .timeout(Duration::from_millis(500))
        .open()?;
    info!("Opened SMS modem on {} at {} baud", path, baud_rate);
    Ok(port)
}

/// Transport that only logs messages, used when no modem is configured.
#[derive(Debug, Clone, Default)]
pub struct LogTransport {
    phone: String,
}

impl LogTransport {
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
        }
    }
}

impl SmsTransport for LogTransport {
    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    async fn deliver(&mut self, message: &str) -> Result<()> {
        info!("SMS to {}: {}", self.phone, message.replace('\n', " | "));
        Ok(())
    }
}
