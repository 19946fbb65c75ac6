//! Readable and JSON exports of a display tree.

use crate::core::DisplayNode;
use crate::error::{DissectError, Result};

const INDENT: &str = "  ";

/// Renders the tree as indented `label: value` lines, one row per line.
///
/// Header rows print just their label; an empty header label prints as `(root)`.
pub fn to_readable_text(nodes: &[DisplayNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node, 0);
    }
    out
}

fn write_node(out: &mut String, node: &DisplayNode, depth: usize) {
    let line = if node.is_leaf() {
        match (node.label.is_empty(), node.value.is_empty()) {
            (true, _) => node.value.clone(),
            (false, true) => format!("{}:", node.label),
            (false, false) => format!("{}: {}", node.label, node.value),
        }
    } else if node.label.is_empty() {
        "(root)".to_string()
    } else {
        node.label.clone()
    };
    out.push_str(&INDENT.repeat(depth));
    out.push_str(&line);
    out.push('\n');
    for child in &node.children {
        write_node(out, child, depth + 1);
    }
}

pub fn to_json_string(nodes: &[DisplayNode]) -> Result<String> {
    serde_json::to_string_pretty(nodes)
        .map_err(|e| DissectError::Serialization(format!("JSON serialization error: {}", e)))
}

pub fn from_json_str(json_str: &str) -> Result<Vec<DisplayNode>> {
    serde_json::from_str(json_str)
        .map_err(|e| DissectError::Serialization(format!("JSON deserialization error: {}", e)))
}
