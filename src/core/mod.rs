//! Core data types for the dissection subsystem.
//!
//! `StructuredValue` is what dissectors produce, `DisplayNode` is what the
//! projector hands to a display layer, and `DissectorDescriptor` is the
//! matching metadata the registry selects on.

pub mod descriptor;
pub mod display_node;
pub mod value;

pub use descriptor::DissectorDescriptor;
pub use display_node::{count_nodes, DisplayNode};
pub use value::{is_private_name, is_text_whitespace, Container, Scalar, StructuredValue, HEX_PREFIX};
