use crate::errors::{Error, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Finds the compilation units of a project.
pub struct FileWalker {
    root: PathBuf,
    extensions: Vec<String>,
    exclude_patterns: Vec<glob::Pattern>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            extensions: vec!["cs".to_string()],
            exclude_patterns: vec![],
        }
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<glob::Pattern>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Matching files, sorted by path.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| {
                Error::load(&self.root, format!("failed to walk project: {}", e))
            })?;
            let path = entry.path();

            if path.is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let has_extension = path
            .extension()
            .map(|ext| ext.to_string_lossy())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)));
        has_extension && !self.is_excluded(path)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative = relative.to_string_lossy().replace('\\', "/");
        let absolute = path.to_string_lossy();

        self.exclude_patterns
            .iter()
            .any(|p| p.matches(&relative) || p.matches(&absolute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_walk_finds_sources_sorted() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Controllers/HomeController.cs");
        touch(temp.path(), "Models/User.cs");
        touch(temp.path(), "Views/Home/Index.cshtml");

        let files = FileWalker::new(temp.path().to_path_buf()).walk().unwrap();

        assert_eq!(
            files,
            vec![
                temp.path().join("Controllers/HomeController.cs"),
                temp.path().join("Models/User.cs"),
            ]
        );
    }

    #[test]
    fn test_walk_applies_exclusions_relative_to_root() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Controllers/HomeController.cs");
        touch(temp.path(), "obj/Debug/AssemblyInfo.cs");
        touch(temp.path(), "Actions.generated.cs");

        let patterns = ["**/obj/**", "**/*.generated.cs"]
            .iter()
            .map(|p| glob::Pattern::new(p).unwrap())
            .collect();
        let files = FileWalker::new(temp.path().to_path_buf())
            .with_exclude_patterns(patterns)
            .walk()
            .unwrap();

        assert_eq!(files, vec![temp.path().join("Controllers/HomeController.cs")]);
    }
}
