/// Error types for the ingestion pipeline and its collaborators.
///
/// `DirectoryReadFailure` is the only kind that is normally recovered
/// locally (turned into a `WalkWarning`); every other kind aborts the
/// operation that raised it.
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IngestError {
    /// A descriptor path contained an empty, `.` or `..` segment.
    #[error("malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: &'static str },

    /// A path used a file as a directory, or a directory as a file.
    #[error("path '{path}' is already a {existing} and cannot also be a {requested}")]
    PathKindConflict {
        path: String,
        existing: &'static str,
        requested: &'static str,
    },

    /// A directory (or a dropped file) could not be read.
    #[error("cannot read '{path}': {message}")]
    DirectoryReadFailure { path: String, message: String },

    /// The analysis collaborator rejected the batch or timed out.
    #[error("analysis failed: {0}")]
    AnalysisFailure(String),

    /// The settings store could not be read or written.
    #[error("settings persistence failed: {0}")]
    PersistenceFailure(String),

    /// `submit` was called while another round was still running.
    #[error("an ingestion is already in progress")]
    SessionBusy,

    /// A blocking wait gave up. The round keeps running in the background.
    #[error("ingestion still running after {0:?}")]
    TimedOut(std::time::Duration),

    /// A setting was toggled before the device settings finished loading.
    #[error("device settings have not been loaded yet")]
    SettingsNotLoaded,
}

pub type Result<T> = std::result::Result<T, IngestError>;

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        Self::PersistenceFailure(err.to_string())
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        Self::PersistenceFailure(err.to_string())
    }
}
