//! Custom panic hook for structured crash reports.
//!
//! A panic in the middle of a run may leave some source files already
//! rewritten. The report names the stage and the unit being processed so the
//! user knows where to look.

use super::context::{get_current_context, get_progress, PipelineContext};
use std::panic::PanicHookInfo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the custom panic hook. Call early in `main`.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        print_crash_report(info);
    }));
}

fn print_crash_report(info: &PanicHookInfo<'_>) {
    let context = get_current_context();
    let (processed, total) = get_progress();

    eprintln!();
    eprintln!("==== actionmap {} crash report ====", VERSION);
    eprintln!("panic: {}", extract_panic_message(info));
    if let Some(location) = info.location() {
        eprintln!(
            "at: {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        );
    }
    eprint!("{}", describe_context(&context, processed, total));

    if std::env::var("RUST_BACKTRACE").is_ok() {
        eprintln!("{}", std::backtrace::Backtrace::capture());
    } else {
        eprintln!("Run with RUST_BACKTRACE=1 for stack trace");
    }
}

fn describe_context(context: &PipelineContext, processed: usize, total: usize) -> String {
    let mut out = String::new();
    match &context.stage {
        Some(stage) => out.push_str(&format!("stage: {}\n", stage)),
        None => out.push_str("stage: (not started)\n"),
    }
    if let Some(file) = &context.current_file {
        out.push_str(&format!("file: {}\n", file.display()));
    }
    if let Some(decl) = &context.current_declaration {
        out.push_str(&format!("declaration: {}\n", decl));
    }
    if total > 0 {
        out.push_str(&format!("progress: {} / {} units\n", processed, total));
    }
    if context.stage.is_some_and(|s| s.writes_sources()) {
        out.push_str("note: files rewritten before the crash are not rolled back\n");
    }
    out
}

fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
