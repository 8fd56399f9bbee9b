//! Shared error types for the application
//!
//! Fatal errors (a project that cannot be loaded, an invalid configuration)
//! travel as [`Error`]. Per-file problems never abort a run; they are recorded
//! as [`UnitFailure`]s and summarized once the pipeline finishes.

pub mod collection;
pub mod summary;

pub use collection::{FailureKind, UnitFailure, UnitResults};
pub use summary::FailureSummary;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for actionmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// The project could not be opened
    #[error("Failed to load project {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Parsing errors
    #[error("Parse error in {file}:{line}:{column}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A rewrite produced output that no longer parses
    #[error("Rewrite of {path} rejected: {message}")]
    RewriteRejected { path: PathBuf, message: String },

    /// A pipeline stage failed
    #[error("Pipeline stage {stage} failed: {message}")]
    Stage { stage: String, message: String },

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Pattern errors
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    /// Create a project load error
    pub fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file system error with path context
    pub fn file_system(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    /// Create a parse error with location
    pub fn parse(
        file: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }

    /// Whether this error should stop the whole run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::RewriteRejected { .. } | Self::Parse { .. })
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
