//! Dissector contract, built-in dissectors and the registry.
//!
//! Built-in dissectors:
//! - `plaintext` passes the whole buffer through as one byte-string scalar
//! - `pcap` parses libpcap ("tcpdump") capture files into header and packet records
//!
//! New formats are added by implementing [`Dissector`]; the registry never
//! needs to change.

pub mod pcap;
pub mod plaintext;
pub mod registry;

use std::sync::Arc;

use crate::core::{DissectorDescriptor, StructuredValue};
use crate::error::{MalformedInputError, Result};
use crate::timeout::CancelToken;

/// Turns the raw bytes of one file format into a [`StructuredValue`].
///
/// Implementations must never panic on malformed input: they either return a
/// (possibly partial) structure or a [`MalformedInputError`]. The input slice
/// is a read-only snapshot.
pub trait Dissector: Send + Sync {
    /// Static name and match hints.
    fn descriptor(&self) -> &DissectorDescriptor;

    /// Parses `data` into a structured value.
    fn dissect(&self, data: &[u8]) -> std::result::Result<StructuredValue, MalformedInputError>;

    /// Cancellable variant used by the background worker.
    ///
    /// The default checks `cancel` around a plain `dissect`; dissectors that
    /// loop over records override this to check per record.
    fn dissect_cancellable(&self, data: &[u8], cancel: &CancelToken) -> Result<StructuredValue> {
        cancel.check()?;
        let value = self.dissect(data)?;
        cancel.check()?;
        Ok(value)
    }

    fn name(&self) -> &str {
        self.descriptor().name()
    }
}

/// Shared handle to a dissector owned by the registry.
pub type DissectorRef = Arc<dyn Dissector>;

/// Runs `dissector` on `data`, turning a panic inside a plugin into a
/// `MalformedInputError` so the caller always gets a value or an error.
pub fn dissect_guarded(
    dissector: &dyn Dissector,
    data: &[u8],
) -> std::result::Result<StructuredValue, MalformedInputError> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| dissector.dissect(data)))
        .unwrap_or_else(|_| {
            Err(MalformedInputError::new(
                dissector.name(),
                "dissector panicked on this input",
            ))
        })
}

/// The dissectors shipped with the crate, in registration order.
pub fn builtin_dissectors() -> Vec<DissectorRef> {
    vec![
        Arc::new(plaintext::PlainTextDissector::new()),
        Arc::new(pcap::TcpdumpDissector::new()),
    ]
}
