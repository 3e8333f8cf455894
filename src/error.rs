//! Error types for the sarsamouse crate

use thiserror::Error;

/// Main error type for the sarsamouse crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("action space is empty")]
    EmptyActionSpace,

    #[error("action {action} is out of range (action count is {action_count})")]
    InvalidAction { action: usize, action_count: usize },

    #[error("invalid breakpoints for channel '{channel}': {reason}")]
    InvalidBreakpoints { channel: String, reason: String },

    #[error("grid for channel '{channel}' has shape {got:?}, expected {expected:?}")]
    GridShape {
        channel: String,
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("snapshot has no grid for channel '{channel}'")]
    MissingChannel { channel: String },

    #[error("rate schedule exhausted at episode {episode}")]
    ScheduleExhausted { episode: u64 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Why a persisted agent record could not be restored.
///
/// Loading never propagates these past the agent boundary; the class is
/// reported in the log before the agent falls back to its defaults.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid agent record: {reason}")]
    Schema { reason: String },
}

impl LoadError {
    /// Short label of the failure class, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::Io { .. } => "io",
            LoadError::Parse { .. } => "parse",
            LoadError::Schema { .. } => "schema",
        }
    }

    pub(crate) fn schema(reason: impl Into<String>) -> Self {
        LoadError::Schema {
            reason: reason.into(),
        }
    }
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
