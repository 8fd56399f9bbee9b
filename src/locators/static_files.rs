use super::StaticFileLocator;
use crate::errors::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file served from the static web root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    pub file_name: String,
    /// Path relative to the web root, `/`-separated.
    pub relative_path: String,
    /// Directory relative to the web root (`""` for the root itself).
    pub collection: String,
}

impl StaticFile {
    /// Collection path split into directory names.
    pub fn collection_segments(&self) -> Vec<&str> {
        self.collection.split('/').filter(|s| !s.is_empty()).collect()
    }
}

/// Every file under `{project}/{static_root}`, sorted by path.
#[derive(Debug)]
pub struct WebRootLocator {
    static_root: PathBuf,
}

impl WebRootLocator {
    pub fn new(static_root: impl Into<PathBuf>) -> Self {
        Self {
            static_root: static_root.into(),
        }
    }
}

impl StaticFileLocator for WebRootLocator {
    fn find(&self, root: &Path) -> Result<Vec<StaticFile>> {
        let web_root = root.join(&self.static_root);
        if !web_root.is_dir() {
            return Ok(Vec::new());
        }

        let files = WalkDir::new(&web_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|entry| {
                let relative = pathdiff::diff_paths(entry.path(), &web_root)?;
                let relative_path = relative.to_string_lossy().replace('\\', "/");
                let collection = relative
                    .parent()
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                Some(StaticFile {
                    file_name: entry.file_name().to_string_lossy().into_owned(),
                    relative_path,
                    collection,
                })
            })
            .collect();
        Ok(files)
    }
}
