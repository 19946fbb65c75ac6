//! UI-agnostic display tree node.

use serde::{Deserialize, Serialize};

/// One row of the dissection tree.
///
/// Header rows (containers and nested sequences) carry an empty `value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNode {
    pub label: String,
    pub value: String,
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub fn leaf(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            children: Vec::new(),
        }
    }

    pub fn header(label: impl Into<String>, children: Vec<DisplayNode>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(DisplayNode::count).sum::<usize>()
    }

    /// Finds a direct child by label.
    pub fn child(&self, label: &str) -> Option<&DisplayNode> {
        self.children.iter().find(|c| c.label == label)
    }
}

/// Total node count of a projected forest.
pub fn count_nodes(nodes: &[DisplayNode]) -> usize {
    nodes.iter().map(DisplayNode::count).sum()
}
