//! Thread-local context tracking for crash reports.
//!
//! Records which pipeline stage is running and which compilation unit a
//! worker is on. Uses thread-local storage (works with rayon parallel
//! iterators) and atomic counters for global progress.

use crate::pipeline::PipelineStage;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static UNITS_PROCESSED: AtomicUsize = AtomicUsize::new(0);
static UNITS_TOTAL: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static CURRENT_CONTEXT: RefCell<PipelineContext> = const { RefCell::new(PipelineContext::new()) };
}

/// Snapshot of what the pipeline was doing.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    pub stage: Option<PipelineStage>,
    pub current_file: Option<PathBuf>,
    pub current_declaration: Option<String>,
}

impl PipelineContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: None,
            current_file: None,
            current_declaration: None,
        }
    }
}

/// RAII guard restoring the previous context on drop.
pub struct ContextGuard {
    previous: PipelineContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

/// Set the current stage until changed again.
pub fn set_stage(stage: PipelineStage) {
    CURRENT_CONTEXT.with(|ctx| {
        ctx.borrow_mut().stage = Some(stage);
    });
}

/// Set the unit being processed on this thread.
#[must_use]
pub fn set_current_file(path: impl Into<PathBuf>) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().current_file = Some(path.into());
        ContextGuard { previous }
    })
}

/// Set the declaration (class or method) being processed on this thread.
#[must_use]
pub fn set_current_declaration(name: impl Into<String>) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().current_declaration = Some(name.into());
        ContextGuard { previous }
    })
}

pub fn set_progress(processed: usize, total: usize) {
    UNITS_PROCESSED.store(processed, Ordering::Relaxed);
    UNITS_TOTAL.store(total, Ordering::Relaxed);
}

pub fn increment_processed() {
    UNITS_PROCESSED.fetch_add(1, Ordering::Relaxed);
}

#[must_use]
pub fn get_current_context() -> PipelineContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

#[must_use]
pub fn get_progress() -> (usize, usize) {
    (
        UNITS_PROCESSED.load(Ordering::Relaxed),
        UNITS_TOTAL.load(Ordering::Relaxed),
    )
}

pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = PipelineContext::new();
    });
}
