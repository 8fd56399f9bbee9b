//! Human-readable run summary.

use crate::pipeline::{CompanionStatus, PipelineReport};
use colored::*;
use std::io::Write;

/// Force colors on or off; `plain` wins over terminal detection.
pub fn configure_colors(plain: bool) {
    if plain {
        colored::control::set_override(false);
    }
}

pub fn write_summary<W: Write>(out: &mut W, report: &PipelineReport) -> std::io::Result<()> {
    let title = if report.dry_run {
        "actionmap (dry run)"
    } else {
        "actionmap"
    };
    writeln!(out, "{} {}", title.bold(), report.project_root.display())?;
    writeln!(
        out,
        "  {} units, {} handlers, {} actions",
        report.units_loaded,
        report.handlers.len(),
        report.action_count()
    )?;

    for handler in &report.handlers {
        writeln!(
            out,
            "    {} {} ({})",
            handler.registry_key.cyan(),
            handler.class.dimmed(),
            handler.actions.join(", ")
        )?;
    }

    let verb = if report.dry_run { "would add" } else { "added" };
    writeln!(
        out,
        "  {} partial to {} classes, virtual to {} methods in {} files",
        verb,
        report.classes_marked_partial,
        report.methods_marked_virtual,
        report.files_rewritten.len()
    )?;

    let status = match report.companion {
        CompanionStatus::Written => "written".green(),
        CompanionStatus::Unchanged => "unchanged".normal(),
        CompanionStatus::Skipped => "not written (dry run)".yellow(),
        CompanionStatus::Failed => "failed".red(),
    };
    writeln!(out, "  {}: {}", report.companion_path.display(), status)?;

    let summary = report.failure_summary();
    if summary.total > 0 {
        let text = summary.report();
        if summary.fails_run() {
            write!(out, "{}", text.red())?;
        } else {
            write!(out, "{}", text.yellow())?;
        }
    }
    Ok(())
}
