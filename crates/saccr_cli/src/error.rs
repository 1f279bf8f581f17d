//! The CLI's own error type, wrapping I/O, (de)serialisation, and
//! `saccr_core` pipeline failures behind one `thiserror` enum.

/// Result alias used throughout the CLI.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced at the command-line boundary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The portfolio fixture file was not valid JSON for its schema.
    #[error("failed to parse portfolio file: {0}")]
    Json(#[from] serde_json::Error),
    /// The SA-CCR pipeline itself failed.
    #[error(transparent)]
    Pipeline(#[from] saccr_core::PipelineError),
    /// A report sink failed outside a full pipeline run (e.g. flushing).
    #[error(transparent)]
    Report(#[from] saccr_core::error::ReportError),
    /// A named file does not exist.
    #[error("file not found: {0}")]
    FileNotFound(String),
    /// A command-line argument was malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
