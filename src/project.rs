//! Projection of a structured value onto a display tree.
//!
//! The walk is depth-first and order-preserving:
//! - container fields become rows in insertion order; `_`-prefixed fields are dropped
//! - a nested container becomes a header row with the field name as label
//! - a sequence field contributes one row per element, labeled `field[i]`
//! - a scalar becomes a leaf row holding its textual form
//!
//! A top-level scalar yields a single leaf with an empty label; a top-level
//! sequence yields a single header row with an empty label whose children
//! are labeled `[i]`.

use crate::core::{is_private_name, Container, DisplayNode, StructuredValue};

/// Projects `value` onto an ordered list of display rows.
///
/// Pure: projecting the same value twice gives equal trees.
pub fn project(value: &StructuredValue) -> Vec<DisplayNode> {
    match value {
        StructuredValue::Container(c) => project_container(c),
        StructuredValue::Sequence(items) => {
            vec![DisplayNode::header("", project_elements("", items))]
        }
        StructuredValue::Scalar(s) => vec![DisplayNode::leaf("", s.to_string())],
    }
}

fn project_container(container: &Container) -> Vec<DisplayNode> {
    let mut out = Vec::with_capacity(container.len());
    for (name, value) in container.iter() {
        if is_private_name(name) {
            continue;
        }
        match value {
            StructuredValue::Container(inner) => {
                out.push(DisplayNode::header(name, project_container(inner)))
            }
            StructuredValue::Sequence(items) => out.extend(project_elements(name, items)),
            StructuredValue::Scalar(s) => out.push(DisplayNode::leaf(name, s.to_string())),
        }
    }
    out
}

fn project_elements(base: &str, items: &[StructuredValue]) -> Vec<DisplayNode> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let label = format!("{}[{}]", base, index);
            match item {
                StructuredValue::Container(inner) => {
                    DisplayNode::header(label, project_container(inner))
                }
                StructuredValue::Sequence(nested) => {
                    let children = project_elements(&label, nested);
                    DisplayNode::header(label, children)
                }
                StructuredValue::Scalar(s) => DisplayNode::leaf(label, s.to_string()),
            }
        })
        .collect()
}
