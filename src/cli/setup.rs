//! Runtime setup for the command line entry point.

use crate::config::{load_config, load_config_file, ActionmapConfig};
use crate::errors::Result;
use std::path::Path;

/// Rayon thread stack size (8MB for deeply nested syntax trees)
const RAYON_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Configure rayon global thread pool once at startup
pub fn configure_thread_pool(jobs: usize) {
    let mut builder = rayon::ThreadPoolBuilder::new().stack_size(RAYON_STACK_SIZE);

    if jobs > 0 {
        builder = builder.num_threads(jobs);
    }

    if let Err(e) = builder.build_global() {
        tracing::debug!("Thread pool already configured: {}", e);
    }
}

/// Get the number of worker threads to use
pub fn get_worker_count(jobs: usize) -> usize {
    if jobs == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    } else {
        jobs
    }
}

/// Configuration for a run: an explicit file wins, else discovery from the
/// project's directory, then command line overrides.
pub fn resolve_config(
    project: &Path,
    config_path: Option<&Path>,
    namespace: Option<&str>,
) -> Result<ActionmapConfig> {
    let mut config = match config_path {
        Some(path) => load_config_file(path)?,
        None => {
            let start = if project.is_dir() {
                project
            } else {
                project.parent().unwrap_or(project)
            };
            load_config(start)
        }
    };

    if let Some(namespace) = namespace {
        config.namespace = namespace.to_string();
    }
    config.validate()?;
    Ok(config)
}
