//! Failure summary generation for a pipeline run.

use super::collection::{FailureKind, UnitFailure};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Summary of per-unit failures, grouped by kind.
#[derive(Debug)]
pub struct FailureSummary {
    pub total: usize,
    pub by_kind: BTreeMap<FailureKind, Vec<PathBuf>>,
}

impl FailureSummary {
    pub fn from_failures(failures: &[UnitFailure]) -> Self {
        let mut by_kind: BTreeMap<FailureKind, Vec<PathBuf>> = BTreeMap::new();
        for failure in failures {
            by_kind
                .entry(failure.kind)
                .or_default()
                .push(failure.path.clone());
        }

        Self {
            total: failures.len(),
            by_kind,
        }
    }

    /// True when at least one failure should make the run exit non-zero.
    pub fn fails_run(&self) -> bool {
        self.by_kind.keys().any(FailureKind::fails_run)
    }

    pub fn report(&self) -> String {
        let mut report = String::new();
        if self.total == 0 {
            return report;
        }

        report.push_str("\nFailure breakdown:\n");
        for (kind, paths) in &self.by_kind {
            report.push_str(&format!("  {}: {} file(s)\n", kind.as_str(), paths.len()));

            for path in paths.iter().take(3) {
                report.push_str(&format!("    - {}\n", path.display()));
            }

            if paths.len() > 3 {
                report.push_str(&format!("    ... and {} more\n", paths.len() - 3));
            }
        }

        report
    }
}
