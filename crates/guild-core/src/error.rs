use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the guild gain core.
#[derive(Error, Debug)]
pub enum GainError {
    /// A snapshot or file was requested that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A file exists but could not be read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot file could not be parsed as JSON.
    #[error("Corrupt snapshot {path}: {source}")]
    CorruptData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A payload is missing the member list, or a member entry is missing or
    /// duplicating its identity/points.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Not enough data to compute a result (fewer than two snapshots in the
    /// window, or an empty gain set).
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Caller-supplied year/month/limit out of the accepted range.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`GainError`] for callers that map errors to
/// user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    CorruptData,
    Schema,
    InsufficientData,
    Validation,
    Config,
    Io,
}

impl GainError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GainError::NotFound(_) => ErrorKind::NotFound,
            GainError::CorruptData { .. } => ErrorKind::CorruptData,
            GainError::Schema(_) => ErrorKind::Schema,
            GainError::InsufficientData(_) => ErrorKind::InsufficientData,
            GainError::Validation(_) => ErrorKind::Validation,
            GainError::Config(_) => ErrorKind::Config,
            GainError::FileRead { .. } | GainError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Convenience alias used throughout the guild crates.
pub type Result<T> = std::result::Result<T, GainError>;
