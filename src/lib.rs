//! parslither: format dissection core.
//!
//! Bytes go in, a [`StructuredValue`] comes out of a [`Dissector`], and
//! [`project`] flattens it into [`DisplayNode`] rows a tree view can show.
//! [`DissectionSession`] ties these together for one open file and
//! [`DissectorRegistry`] decides which dissector handles it.

/// Core data types module
pub mod core;

pub mod config;
pub mod dissect;
pub mod error;
pub mod export;
pub mod io;
pub mod logging;
pub mod project;
pub mod session;
pub mod sniff;
pub mod timeout;
pub mod worker;

pub use crate::config::DissectConfig;
pub use crate::core::{Container, DisplayNode, DissectorDescriptor, Scalar, StructuredValue};
pub use crate::dissect::registry::{DissectorRegistry, RegistrySnapshot};
pub use crate::dissect::{builtin_dissectors, Dissector, DissectorRef};
pub use crate::error::{DissectError, MalformedInputError, Result};
pub use crate::project::project;
pub use crate::session::{BackgroundResult, DissectionOutcome, DissectionSession, SessionState};
pub use crate::sniff::{CombinedSniffer, MediaTypeSniffer};
pub use crate::worker::{BackgroundTree, DissectionWorker};
