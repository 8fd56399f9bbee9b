//! Parsed compilation units and the project-wide semantic model.

pub mod loader;
pub mod parser;
pub mod semantic;
pub mod type_ref;

pub use loader::{FileSystemLoader, ProjectLoader};
pub use semantic::{Resolution, Scope, SemanticModel, Symbol, SymbolOrigin};
pub use type_ref::{NameSegment, TypeRef};

use crate::errors::{Result, UnitFailure};
use std::path::{Path, PathBuf};
use tree_sitter::Tree;

/// One parsed C# file.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub text: String,
    pub tree: Tree,
}

impl SourceUnit {
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let text = text.into();
        let tree = parser::parse_source(&text, &path)?;
        Ok(Self { path, text, tree })
    }

    pub fn has_errors(&self) -> bool {
        parser::has_parse_errors(&self.tree)
    }

    /// 1-indexed position of the first syntax error, if any.
    pub fn first_error(&self) -> Option<(usize, usize)> {
        parser::first_error_position(&self.tree)
    }

    pub fn text_of(&self, node: &tree_sitter::Node) -> &str {
        parser::node_text(node, &self.text)
    }
}

/// A loaded project: every unit that could be read and parsed, plus the
/// files that could not.
#[derive(Debug, Default)]
pub struct Project {
    pub root: PathBuf,
    pub units: Vec<SourceUnit>,
    pub failures: Vec<UnitFailure>,
}

impl Project {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path relative to the project root, with `/` separators.
    pub fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}
