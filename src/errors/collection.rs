//! Failure collection for per-file pipeline work.
//!
//! Every compilation unit is processed independently: a unit that cannot be
//! read, parsed or written is recorded here and the run carries on with the
//! rest. The orchestrator reports BOTH the successes and the failures.

use std::path::PathBuf;

/// Results from a batch of per-unit operations.
#[derive(Debug, Clone)]
pub struct UnitResults<T> {
    pub successes: Vec<T>,
    pub failures: Vec<UnitFailure>,
}

impl<T> UnitResults<T> {
    pub fn new(successes: Vec<T>, failures: Vec<UnitFailure>) -> Self {
        Self {
            successes,
            failures,
        }
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn total_count(&self) -> usize {
        self.success_count() + self.failure_count()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<T> Default for UnitResults<T> {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

/// Information about a unit that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UnitFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

impl UnitFailure {
    pub fn new(path: PathBuf, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    pub fn read(path: PathBuf, error: &std::io::Error) -> Self {
        Self::new(path, FailureKind::Read, error.to_string())
    }

    pub fn syntax(path: PathBuf, line: usize, column: usize) -> Self {
        Self::new(
            path,
            FailureKind::SyntaxErrorSkip,
            format!("blocking syntax error at {}:{}", line, column),
        )
    }

    pub fn write(path: PathBuf, error: &crate::errors::Error) -> Self {
        Self::new(path, FailureKind::Write, error.to_string())
    }

    pub fn rejected(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(path, FailureKind::RewriteRejected, message)
    }
}

/// What went wrong with a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Read,
    SyntaxErrorSkip,
    RewriteRejected,
    Write,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "File read",
            Self::SyntaxErrorSkip => "Skipped (syntax errors)",
            Self::RewriteRejected => "Rewrite rejected",
            Self::Write => "File write",
        }
    }

    /// Failures that make the run report a non-zero status.
    ///
    /// Syntax skips and unreadable files are warnings: the unit was never
    /// touched. Anything that failed while persisting output is not.
    pub fn fails_run(&self) -> bool {
        matches!(self, Self::Write | Self::RewriteRejected)
    }
}
