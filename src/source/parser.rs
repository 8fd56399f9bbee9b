//! Tree-sitter parser integration for C#

use crate::errors::{Error, Result};
use std::path::Path;
use tree_sitter::{Language as TsLanguage, Node, Parser, Tree};

fn language() -> TsLanguage {
    tree_sitter_c_sharp::LANGUAGE.into()
}

/// Parse C# source code into a tree-sitter tree
pub fn parse_source(content: &str, path: &Path) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&language())
        .map_err(|e| Error::parse(path, 0, 0, format!("failed to set C# language: {}", e)))?;

    parser
        .parse(content, None)
        .ok_or_else(|| Error::parse(path, 0, 0, "parser returned no tree"))
}

/// Check if a parse tree has errors
pub fn has_parse_errors(tree: &Tree) -> bool {
    tree.root_node().has_error()
}

/// Position (1-indexed line, column) of the first error or missing node.
pub fn first_error_position(tree: &Tree) -> Option<(usize, usize)> {
    fn visit(node: Node) -> Option<Node> {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            return None;
        }
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).find_map(visit);
        found
    }

    visit(tree.root_node()).map(|n| (node_line(&n), node_column(&n)))
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Get the line number for a tree-sitter node (1-indexed)
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Get the column number for a tree-sitter node (1-indexed)
pub fn node_column(node: &Node) -> usize {
    node.start_position().column + 1
}

/// Named children of `node`, skipping comments.
pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// All children of `node`, anonymous tokens included.
pub fn all_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

pub fn child_of_kind<'t>(node: &Node<'t>, kind: &str) -> Option<Node<'t>> {
    all_children(node).into_iter().find(|c| c.kind() == kind)
}

/// C# declaration modifiers in canonical order.
pub const MODIFIER_KEYWORDS: &[&str] = &[
    "public", "private", "protected", "internal", "file", "static", "extern", "new", "virtual",
    "abstract", "sealed", "override", "readonly", "unsafe", "required", "volatile", "async",
    "partial",
];

/// Modifier tokens written directly on a declaration, in source order.
///
/// Depending on the grammar version a modifier is either a named `modifier`
/// node or a bare keyword token; both are accepted.
pub fn modifier_nodes<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    all_children(node)
        .into_iter()
        .filter(|c| {
            c.kind() == "modifier" || (!c.is_named() && MODIFIER_KEYWORDS.contains(&c.kind()))
        })
        .collect()
}

/// Modifier keywords of a declaration as text.
pub fn modifiers(node: &Node, source: &str) -> Vec<String> {
    modifier_nodes(node)
        .iter()
        .map(|m| node_text(m, source).trim().to_string())
        .collect()
}
