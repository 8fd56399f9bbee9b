//! Modifier insertion points.

use crate::source::parser::{child_of_kind, modifier_nodes, node_text, MODIFIER_KEYWORDS};
use serde::Serialize;
use tree_sitter::Node;

/// Text inserted at a byte offset of the original source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Insertion {
    pub offset: usize,
    pub text: String,
}

impl Insertion {
    fn keyword(offset: usize, keyword: &str) -> Self {
        Self {
            offset,
            text: format!("{} ", keyword),
        }
    }

    /// The keyword this insertion adds.
    pub fn keyword_text(&self) -> &str {
        self.text.trim_end()
    }
}

fn rank(keyword: &str) -> Option<usize> {
    MODIFIER_KEYWORDS.iter().position(|k| *k == keyword)
}

/// Where `keyword` goes among the declaration's modifiers: before the first
/// existing modifier that ranks after it, else at `fallback`.
fn insertion_point(node: &Node, source: &str, keyword: &str, fallback: usize) -> usize {
    let Some(own) = rank(keyword) else {
        return fallback;
    };
    modifier_nodes(node)
        .iter()
        .find(|m| rank(node_text(m, source).trim()).is_some_and(|r| r > own))
        .map(|m| m.start_byte())
        .unwrap_or(fallback)
}

fn has_any(node: &Node, source: &str, keywords: &[&str]) -> bool {
    modifier_nodes(node)
        .iter()
        .any(|m| keywords.contains(&node_text(m, source).trim()))
}

/// `partial` for a class declaration lacking it, placed before `class`.
pub fn partial_insertion(class: &Node, source: &str) -> Option<Insertion> {
    if has_any(class, source, &["partial"]) {
        return None;
    }
    let keyword = child_of_kind(class, "class")?;
    let offset = insertion_point(class, source, "partial", keyword.start_byte());
    Some(Insertion::keyword(offset, "partial"))
}

/// `virtual` for a method lacking it and not already overriding or abstract.
pub fn virtual_insertion(method: &Node, source: &str) -> Option<Insertion> {
    if has_any(method, source, &["virtual", "override", "abstract", "static"]) {
        return None;
    }
    let return_type = method
        .child_by_field_name("returns")
        .or_else(|| method.child_by_field_name("type"))?;
    let offset = insertion_point(method, source, "virtual", return_type.start_byte());
    Some(Insertion::keyword(offset, "virtual"))
}

/// Apply insertions to `source`. Offsets refer to the original text.
pub fn apply(source: &str, insertions: &[Insertion]) -> String {
    let mut sorted: Vec<&Insertion> = insertions.iter().collect();
    sorted.sort();

    let extra: usize = sorted.iter().map(|i| i.text.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    let mut cursor = 0;
    for insertion in sorted {
        out.push_str(&source[cursor..insertion.offset]);
        out.push_str(&insertion.text);
        cursor = insertion.offset;
    }
    out.push_str(&source[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::parser::{named_children, parse_source};
    use std::path::Path;

    fn first_method_insertion(source: &str) -> Option<Insertion> {
        let tree = parse_source(source, Path::new("T.cs")).unwrap();
        let class = named_children(&tree.root_node())[0];
        let body = class.child_by_field_name("body").unwrap();
        let method = named_children(&body)
            .into_iter()
            .find(|n| n.kind() == "method_declaration")
            .unwrap();
        virtual_insertion(&method, source)
    }

    fn rewrite_first_method(source: &str) -> String {
        match first_method_insertion(source) {
            Some(insertion) => apply(source, &[insertion]),
            None => source.to_string(),
        }
    }

    #[test]
    fn test_virtual_goes_before_return_type() {
        assert_eq!(
            rewrite_first_method("class C { public IActionResult Index() => null; }"),
            "class C { public virtual IActionResult Index() => null; }"
        );
    }

    #[test]
    fn test_virtual_goes_before_later_ranked_modifier() {
        assert_eq!(
            rewrite_first_method("class C { public async Task<IActionResult> Save() => null; }"),
            "class C { public virtual async Task<IActionResult> Save() => null; }"
        );
        assert_eq!(
            rewrite_first_method("class C { public new IActionResult Index() => null; }"),
            "class C { public new virtual IActionResult Index() => null; }"
        );
    }

    #[test]
    fn test_overriding_methods_untouched() {
        assert!(first_method_insertion("class C { public override IActionResult A() => null; }")
            .is_none());
        assert!(first_method_insertion("class C { public virtual IActionResult A() => null; }")
            .is_none());
    }

    #[test]
    fn test_partial_goes_before_class_keyword() {
        let source = "[Area(\"A\")]\npublic sealed class HomeController : Controller { }";
        let tree = parse_source(source, Path::new("T.cs")).unwrap();
        let class = named_children(&tree.root_node())[0];

        let insertion = partial_insertion(&class, source).unwrap();
        assert_eq!(
            apply(source, &[insertion]),
            "[Area(\"A\")]\npublic sealed partial class HomeController : Controller { }"
        );
    }

    #[test]
    fn test_apply_keeps_offsets_relative_to_original() {
        let insertions = vec![Insertion::keyword(6, "b"), Insertion::keyword(0, "a")];
        assert_eq!(apply("class X", &insertions), "a class b X");
    }
}
