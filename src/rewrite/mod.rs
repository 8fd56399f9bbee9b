//! Modifier Rewriter
//!
//! Marks handler classes `partial` and their actions `virtual`. The rewrite
//! never mutates its input: it returns a new unit built from the original
//! text plus keyword insertions, re-parsed, together with a flag telling
//! whether the result differs structurally from the input.

pub mod equivalence;
pub mod modifiers;

pub use equivalence::structurally_equivalent;
pub use modifiers::Insertion;

use crate::analysis::ClassMatch;
use crate::errors::{Error, Result};
use crate::source::SourceUnit;
use std::collections::HashSet;
use tree_sitter::{Node, TreeCursor};

/// Declarations of one unit to mark, by start byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteTargets {
    pub classes: HashSet<usize>,
    pub methods: HashSet<usize>,
}

impl RewriteTargets {
    pub fn from_matches(matches: &[ClassMatch]) -> Self {
        let mut targets = Self::default();
        for class_match in matches {
            targets.classes.insert(class_match.class_offset());
            targets.methods.extend(class_match.virtual_targets());
        }
        targets
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.methods.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Rewrite {
    pub unit: SourceUnit,
    pub changed: bool,
    pub insertions: Vec<Insertion>,
}

/// Insert missing modifiers at the targeted declarations of `unit`.
///
/// A result that gains syntax errors the input did not have is rejected with
/// [`Error::RewriteRejected`]; the caller must leave the file untouched.
pub fn rewrite(unit: &SourceUnit, targets: &RewriteTargets) -> Result<Rewrite> {
    let mut insertions = Vec::new();
    if !targets.is_empty() {
        let mut cursor = unit.tree.walk();
        collect_insertions(&mut cursor, unit, targets, &mut insertions);
    }
    insertions.sort();
    insertions.dedup();

    if insertions.is_empty() {
        return Ok(Rewrite {
            unit: unit.clone(),
            changed: false,
            insertions,
        });
    }

    let text = modifiers::apply(&unit.text, &insertions);
    let rewritten = SourceUnit::parse(unit.path.clone(), text)?;
    if rewritten.has_errors() && !unit.has_errors() {
        let (line, column) = rewritten.first_error().unwrap_or((0, 0));
        return Err(Error::RewriteRejected {
            path: unit.path.clone(),
            message: format!("output no longer parses at {}:{}", line, column),
        });
    }

    let changed = !structurally_equivalent(unit, &rewritten);
    tracing::debug!(
        "{}: {} modifier insertions",
        unit.path.display(),
        insertions.len()
    );
    Ok(Rewrite {
        unit: rewritten,
        changed,
        insertions,
    })
}

fn collect_insertions(
    cursor: &mut TreeCursor,
    unit: &SourceUnit,
    targets: &RewriteTargets,
    out: &mut Vec<Insertion>,
) {
    let node: Node = cursor.node();
    let insertion = match node.kind() {
        "class_declaration" if targets.classes.contains(&node.start_byte()) => {
            modifiers::partial_insertion(&node, &unit.text)
        }
        "method_declaration" if targets.methods.contains(&node.start_byte()) => {
            modifiers::virtual_insertion(&node, &unit.text)
        }
        _ => None,
    };
    out.extend(insertion);

    if cursor.goto_first_child() {
        loop {
            collect_insertions(cursor, unit, targets, out);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn targets(classes: &[usize], methods: &[usize]) -> RewriteTargets {
        RewriteTargets {
            classes: classes.iter().copied().collect(),
            methods: methods.iter().copied().collect(),
        }
    }

    #[test]
    fn test_rewrite_marks_targets_only() {
        let source = indoc! {r#"
            public class HomeController : Controller
            {
                public IActionResult Index() => View();
                public IActionResult About() => View();
            }
        "#};
        let unit = SourceUnit::parse("Home.cs", source).unwrap();
        let index = source.find("public IActionResult Index").unwrap();

        let result = rewrite(&unit, &targets(&[0], &[index])).unwrap();

        assert!(result.changed);
        assert_eq!(result.insertions.len(), 2);
        assert!(result.unit.text.contains("public partial class HomeController"));
        assert!(result.unit.text.contains("public virtual IActionResult Index()"));
        assert!(result.unit.text.contains("    public IActionResult About()"));
    }

    #[test]
    fn test_no_targets_is_unchanged_identity() {
        let unit = SourceUnit::parse("A.cs", "class A { }").unwrap();
        let result = rewrite(&unit, &RewriteTargets::default()).unwrap();
        assert!(!result.changed);
        assert_eq!(result.unit.text, unit.text);
    }

    #[test]
    fn test_already_marked_declarations_yield_nothing() {
        let source = "public partial class H : Controller { public virtual IActionResult I() => View(); }";
        let unit = SourceUnit::parse("H.cs", source).unwrap();
        let method = source.find("public virtual").unwrap();

        let result = rewrite(&unit, &targets(&[0], &[method])).unwrap();

        assert!(!result.changed);
        assert!(result.insertions.is_empty());
    }
}
