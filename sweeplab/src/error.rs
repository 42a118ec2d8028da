//! Errors of the sweep layer.

use scpi_endpoint::EndpointError;
use thiserror::Error;

/// Errors raised by the sweep controller and the rigs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SweepError {
    /// The sweep cannot run with the given configuration. Raised before any step executes.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Communication with an instrument failed outside of a step, e.g., while preparing a rig.
    #[error(transparent)]
    Transport(#[from] EndpointError),
}

/// Errors raised while writing or reading persisted records.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordError {
    /// A line has fewer fields than the record layout requires.
    #[error("Malformed record in line {line}: expected {expected} fields, found {found}")]
    MalformedRecord {
        /// Line number in the file, starting at 1.
        line: u64,
        /// Number of fields the layout requires.
        expected: usize,
        /// Number of fields found.
        found: usize,
    },
    /// A field holds a value that cannot be parsed.
    #[error("Invalid value '{value}' in line {line}")]
    InvalidValue {
        /// Line number in the file, starting at 1.
        line: u64,
        /// The offending field.
        value: String,
    },
    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The delimited text could not be written or tokenized.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Errors raised while exporting chart images.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChartError {
    /// The plot directory could not be created.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The plotting backend failed.
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
}
