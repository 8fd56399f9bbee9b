//! Observability infrastructure: logging setup, crash reports and the
//! thread-local context they draw on.
//!
//! ```ignore
//! use actionmap::observability::{init_logging, install_panic_hook};
//!
//! fn main() {
//!     install_panic_hook();
//!     init_logging(1, false);
//!     // ... run the pipeline
//! }
//! ```

pub mod context;
pub mod logging;
pub mod panic_hook;

pub use context::{
    get_current_context, get_progress, increment_processed, set_current_declaration,
    set_current_file, set_progress, set_stage, ContextGuard, PipelineContext,
};
pub use logging::init_logging;
pub use panic_hook::install_panic_hook;
