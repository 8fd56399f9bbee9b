use super::ViewLocator;
use crate::errors::Result;
use std::path::Path;
use walkdir::WalkDir;

pub const VIEW_EXTENSION: &str = "cshtml";

/// A view template belonging to one handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub area: Option<String>,
    /// Handler route name (`Home` for `Views/Home/Index.cshtml`).
    pub handler: String,
    pub name: String,
    /// Path relative to the project root, `/`-separated.
    pub relative_path: String,
}

/// Conventional Razor layout: `Views/{Handler}/{View}.cshtml` and
/// `Areas/{Area}/Views/{Handler}/{View}.cshtml`.
#[derive(Debug, Default)]
pub struct RazorViewLocator;

impl RazorViewLocator {
    fn collect(root: &Path, views_dir: &Path, area: Option<&str>, out: &mut Vec<View>) {
        if !views_dir.is_dir() {
            return;
        }
        let entries = WalkDir::new(views_dir)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file());

        for entry in entries {
            let path = entry.path();
            let is_view = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(VIEW_EXTENSION));
            let handler = path
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned());
            let name = path.file_stem().map(|n| n.to_string_lossy().into_owned());

            if let (true, Some(handler), Some(name)) = (is_view, handler, name) {
                let relative = pathdiff::diff_paths(path, root)
                    .unwrap_or_else(|| path.to_path_buf())
                    .to_string_lossy()
                    .replace('\\', "/");
                out.push(View {
                    area: area.map(str::to_string),
                    handler,
                    name,
                    relative_path: relative,
                });
            }
        }
    }
}

impl ViewLocator for RazorViewLocator {
    fn find(&self, root: &Path) -> Result<Vec<View>> {
        let mut views = Vec::new();
        Self::collect(root, &root.join("Views"), None, &mut views);

        let areas_dir = root.join("Areas");
        if areas_dir.is_dir() {
            let areas = WalkDir::new(&areas_dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_dir());
            for area in areas {
                let name = area.file_name().to_string_lossy().into_owned();
                Self::collect(root, &area.path().join("Views"), Some(&name), &mut views);
            }
        }
        Ok(views)
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
    fn test_finds_handler_and_area_views() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Views/Home/Index.cshtml");
        touch(temp.path(), "Views/Home/About.cshtml");
        touch(temp.path(), "Views/Home/notes.txt");
        touch(temp.path(), "Views/_ViewStart.cshtml");
        touch(temp.path(), "Areas/Admin/Views/Users/List.cshtml");

        let views = RazorViewLocator.find(temp.path()).unwrap();

        let summary: Vec<_> = views
            .iter()
            .map(|v| (v.area.as_deref(), v.handler.as_str(), v.name.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (None, "Home", "About"),
                (None, "Home", "Index"),
                (Some("Admin"), "Users", "List"),
            ]
        );
        assert_eq!(views[0].relative_path, "Views/Home/About.cshtml");
    }
}
