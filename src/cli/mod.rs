//! CLI module for actionmap
//!
//! - Argument parsing (`args`)
//! - Runtime and configuration setup (`setup`)
//! - The run summary printed to stdout (`output`)

pub mod args;
pub mod output;
pub mod setup;

pub use args::{parse_args, Cli};
pub use output::{configure_colors, write_summary};
pub use setup::{configure_thread_pool, get_worker_count, resolve_config};
