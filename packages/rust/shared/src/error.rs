//! Error types for tablesift.
//!
//! Library crates use [`TableSiftError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all tablesift operations.
#[derive(Debug, thiserror::Error)]
pub enum TableSiftError {
    /// An input file could not be parsed at all.
    #[error("parse error in {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The title cell (row 0, column 1) is absent or blank.
    #[error("missing title: {message}")]
    MissingTitle { message: String },

    /// No usable header or data rows remain after structural validation.
    #[error("structural error: {message}")]
    Structural { message: String },

    /// Input folder missing, output destination unwritable, and similar.
    #[error("setup error: {message}")]
    Setup { message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TableSiftError>;

impl TableSiftError {
    /// Create a parse error for the file at `path`.
    pub fn parse(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a missing-title error from any displayable message.
    pub fn missing_title(msg: impl Into<String>) -> Self {
        Self::MissingTitle {
            message: msg.into(),
        }
    }

    /// Create a structural error from any displayable message.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural {
            message: msg.into(),
        }
    }

    /// Create a setup error from any displayable message.
    pub fn setup(msg: impl Into<String>) -> Self {
        Self::Setup {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must abort the run.
    ///
    /// Parse, title and structural failures only skip the offending file or
    /// table; everything else means the run cannot produce trustworthy output.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Parse { .. } | Self::MissingTitle { .. } | Self::Structural { .. }
        )
    }

    /// Short machine-friendly name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse",
            Self::MissingTitle { .. } => "missing-title",
            Self::Structural { .. } => "structural",
            Self::Setup { .. } => "setup",
            Self::Config { .. } => "config",
            Self::Io { .. } => "io",
        }
    }
}
