//! Token-level structural equivalence of two parse trees.
//!
//! Two trees are equivalent when their leaf tokens, comments aside, have the
//! same kinds and texts in the same order. Whitespace and comment edits do not
//! count as a change.

use crate::source::SourceUnit;
use tree_sitter::{Node, TreeCursor};

fn leaf_tokens<'a>(unit: &'a SourceUnit) -> Vec<(&'static str, &'a str)> {
    let mut tokens = Vec::new();
    let mut cursor = unit.tree.walk();
    collect(&mut cursor, &unit.text, &mut tokens);
    tokens
}

fn collect<'a>(
    cursor: &mut TreeCursor,
    source: &'a str,
    out: &mut Vec<(&'static str, &'a str)>,
) {
    let node: Node = cursor.node();
    if node.kind() == "comment" {
        return;
    }
    if node.child_count() == 0 {
        out.push((node.kind(), &source[node.start_byte()..node.end_byte()]));
        return;
    }
    if cursor.goto_first_child() {
        loop {
            collect(cursor, source, out);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

pub fn structurally_equivalent(left: &SourceUnit, right: &SourceUnit) -> bool {
    leaf_tokens(left) == leaf_tokens(right)
}
