//! Error types for the gridworld crate

use thiserror::Error;

/// Main error type for the gridworld crate
///
/// Numerical degeneracies (underflow, non-finite EFE) are never reported here;
/// they are resolved in place by uniform fallbacks and sentinels.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("location ({row}, {col}) is outside the {size}x{size} grid")]
    InvalidLocation { row: usize, col: usize, size: usize },

    #[error("cell index {index} is outside a grid of {cells} cells")]
    InvalidIndex { index: usize, cells: usize },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("policy index {index} is out of range (only {count} policies)")]
    InvalidPolicy { index: usize, count: usize },

    #[error("environment invariant violated: {message}")]
    InconsistentEnvironment { message: String },

    #[error("changing '{name}' requires a reset of the simulation")]
    RequiresReset { name: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("scheduler is no longer running")]
    SchedulerClosed,
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
