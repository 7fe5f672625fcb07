/// Error types shared across the tracker
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the signal pipeline and its configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("{operation} requires at least {required} data points, got {actual}")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("window not ready: {filled} of {required} entries written")]
    WindowNotReady { filled: usize, required: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Analog input failures. A failed read skips the current tick.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("failed to read sensor at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sensor at {path} returned unparsable value '{raw}'")]
    Parse { path: PathBuf, raw: String },

    #[error("raw count {raw} outside {bits}-bit range")]
    OutOfRange { raw: u64, bits: u32 },
}

#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("failed to drive indicator at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
