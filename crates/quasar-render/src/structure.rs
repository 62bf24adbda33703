//! Indented text outline of a render tree.

use crate::recording::RenderNode;
use quasar_style::LayoutDirection;
use std::fmt::Write as _;

/// One line per node: `name (TYPE)`, plus `[Row]`/`[Column]` for frames
/// with a layout, indented two spaces per level.
pub fn generate_structure(root: &RenderNode) -> String {
    let mut out = String::new();
    write_node(root, 0, &mut out);
    out
}

fn write_node(node: &RenderNode, depth: usize, out: &mut String) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = write!(out, "{:indent$}{} ({})", "", node.name(), node.kind.as_str(), indent = depth * 2);
    match node.props.layout {
        Some(LayoutDirection::Horizontal) => out.push_str(" [Row]"),
        Some(LayoutDirection::Vertical) => out.push_str(" [Column]"),
        None => {}
    }
    for child in &node.children {
        write_node(child, depth + 1, out);
    }
}
