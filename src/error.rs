//! Engine errors.

/// Errors produced while locating, reading, or querying a session transcript.
///
/// Degraded prompt detection is deliberately not represented here: a session
/// that falls back to regex or raw-dump segmentation still produces a usable
/// answer and is surfaced as a warning on the response instead.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// No transcript file could be resolved, or the resolved path is gone.
    #[error("No session transcript found: {hint}")]
    SessionNotFound { hint: String },

    /// The transcript exists but its envelope is not a format we read.
    /// Usually a version mismatch with the recorder.
    #[error("Unrecognized transcript format: {reason}")]
    Format { reason: String },

    /// A query parameter violated its contract (e.g. `last(0)`).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The user config file exists but cannot be used.
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Failed to read transcript: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, ContextError>;
