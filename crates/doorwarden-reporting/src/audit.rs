//! Append-only audit trail.
//!
//! One line per access event, in one of two framings:
//!
//! - **PLX-DAQ**: the spreadsheet streaming format read off a serial line.
//!   The header clears the sheet and labels the columns; every row starts
//!   with `DATA`. Commas inside fields are replaced with spaces.
//! - **CSV**: a plain header row and RFC 4180 quoted rows.

use crate::{
    Result,
    error::ReportError,
    format::{audit_date, clock_time_seconds},
};
use doorwarden_access::AccessEvent;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::io::Write;

const COLUMNS: [&str; 6] = ["Access", "Time", "Date", "Keycard UID", "Name", "Reason"];

/// Line framing of the audit trail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditFormat {
    #[default]
    #[serde(rename = "plx-daq")]
    PlxDaq,
    #[serde(rename = "csv")]
    Csv,
}

impl fmt::Display for AuditFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuditFormat::PlxDaq => write!(f, "plx-daq"),
            AuditFormat::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for AuditFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plx-daq" | "plxdaq" => Ok(AuditFormat::PlxDaq),
            "csv" => Ok(AuditFormat::Csv),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Column values of one audit row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub access: &'static str,
    pub time: String,
    pub date: String,
    pub badge_id: String,
    pub name: String,
    pub reason: String,
}

impl From<&AccessEvent> for AuditRecord {
    fn from(event: &AccessEvent) -> Self {
        Self {
            access: if event.granted() { "Granted" } else { "Denied" },
            time: clock_time_seconds(&event.timestamp),
            date: audit_date(&event.timestamp),
            badge_id: event.badge_id.to_string(),
            name: event.subject_name.clone(),
            reason: event.reason(),
        }
    }
}

impl AuditRecord {
    fn fields(&self) -> [&str; 6] {
        [
            self.access,
            &self.time,
            &self.date,
            &self.badge_id,
            &self.name,
            &self.reason,
        ]
    }

    /// Render the record as one line without the trailing newline.
    pub fn to_line(&self, format: AuditFormat) -> String {
        match format {
            AuditFormat::PlxDaq => {
                let fields: Vec<_> = self.fields().into_iter().map(plx_field).collect();
                format!("DATA,{}", fields.join(","))
            }
            AuditFormat::Csv => {
                let fields: Vec<_> = self.fields().into_iter().map(csv_field).collect();
                fields.join(",")
            }
        }
    }
}

fn plx_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '\n', '\r']) {
        Cow::Owned(value.replace([',', '\n', '\r'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Header lines emitted once before the first record.
pub fn header_lines(format: AuditFormat) -> Vec<String> {
    match format {
        AuditFormat::PlxDaq => vec![
            "CLEARDATA".to_string(),
            format!("LABEL,{}", COLUMNS.join(",")),
            "RESETTIMER".to_string(),
        ],
        AuditFormat::Csv => vec![COLUMNS.join(",")],
    }
}

/// Destination of audit records.
pub trait AuditSink: Send {
    /// Emit the header. Called once at startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn start(&mut self) -> Result<()>;

    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn record(&mut self, event: &AccessEvent) -> Result<()>;
}

/// Audit sink writing lines to any byte sink (file, serial port, stdout).
///
/// Every line is flushed as soon as it is written.
///
/// # Examples
///
/// ```
/// use doorwarden_reporting::audit::{AuditFormat, AuditSink, WriterAuditSink};
///
/// let mut sink = WriterAuditSink::new(Vec::new(), AuditFormat::PlxDaq);
/// sink.start().unwrap();
///
/// let output = String::from_utf8(sink.into_inner()).unwrap();
/// assert_eq!(
///     output,
///     "CLEARDATA\nLABEL,Access,Time,Date,Keycard UID,Name,Reason\nRESETTIMER\n"
/// );
/// ```
#[derive(Debug)]
pub struct WriterAuditSink<W> {
    writer: W,
    format: AuditFormat,
}

impl<W: Write + Send> WriterAuditSink<W> {
    pub fn new(writer: W, format: AuditFormat) -> Self {
        Self { writer, format }
    }

    pub fn format(&self) -> AuditFormat {
        self.format
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> AuditSink for WriterAuditSink<W> {
    fn start(&mut self) -> Result<()> {
        for line in header_lines(self.format) {
            self.write_line(&line)?;
        }
        Ok(())
    }

    fn record(&mut self, event: &AccessEvent) -> Result<()> {
        let line = AuditRecord::from(event).to_line(self.format);
        self.write_line(&line)
    }
}
