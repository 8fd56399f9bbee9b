//! Turns a project path into parsed compilation units.

use super::{Project, SourceUnit};
use crate::errors::{Error, Result, UnitFailure};
use crate::io::{read_file, FileWalker};
use crate::observability::{increment_processed, set_current_file, set_progress};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE_EXTENSION: &str = "csproj";

/// Source of compilation units for a run.
pub trait ProjectLoader: Send + Sync {
    fn load(&self, project: &Path) -> Result<Project>;
}

/// Loads every `.cs` file under the project root that no exclusion glob
/// matches. Unreadable files become [`UnitFailure`]s; the run continues.
pub struct FileSystemLoader {
    exclude_patterns: Vec<glob::Pattern>,
}

impl FileSystemLoader {
    pub fn new(exclude_patterns: Vec<glob::Pattern>) -> Self {
        Self { exclude_patterns }
    }
}

impl ProjectLoader for FileSystemLoader {
    fn load(&self, project: &Path) -> Result<Project> {
        let root = resolve_project_root(project)?;
        let files = FileWalker::new(root.clone())
            .with_exclude_patterns(self.exclude_patterns.clone())
            .walk()?;

        log::debug!("Found {} source files under {}", files.len(), root.display());
        set_progress(0, files.len());

        let loaded = files
            .par_iter()
            .map(|path| load_unit(path))
            .collect::<Result<Vec<_>>>()?;

        let mut project = Project {
            root,
            ..Default::default()
        };
        for entry in loaded {
            match entry {
                Ok(unit) => project.units.push(unit),
                Err(failure) => project.failures.push(failure),
            }
        }
        Ok(project)
    }
}

fn load_unit(path: &Path) -> Result<std::result::Result<SourceUnit, UnitFailure>> {
    let _file = set_current_file(path);
    let outcome = match read_file(path) {
        Ok(text) => Ok(SourceUnit::parse(path, text)?),
        Err(e) => {
            log::warn!("Failed to read {}: {}", path.display(), e);
            Err(UnitFailure::read(path.to_path_buf(), &e))
        }
    };
    increment_processed();
    Ok(outcome)
}

/// The directory a project path stands for: the parent of a `.csproj` file
/// or the directory itself.
pub fn resolve_project_root(project: &Path) -> Result<PathBuf> {
    if !project.exists() {
        return Err(Error::load(project, "path does not exist"));
    }
    let canonical = project
        .canonicalize()
        .map_err(|e| Error::load(project, e.to_string()))?;

    if canonical.is_dir() {
        return Ok(canonical);
    }

    let is_project_file = canonical
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PROJECT_FILE_EXTENSION));
    match canonical.parent() {
        Some(parent) if is_project_file => Ok(parent.to_path_buf()),
        _ => Err(Error::load(
            project,
            "expected a .csproj file or a project directory",
        )),
    }
}
