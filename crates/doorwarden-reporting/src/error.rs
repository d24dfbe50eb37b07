use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Unknown audit format: {0}")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
