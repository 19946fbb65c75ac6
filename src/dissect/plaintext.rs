//! Passthrough dissector for plain text files.

use crate::core::{DissectorDescriptor, Scalar, StructuredValue};
use crate::dissect::Dissector;
use crate::error::MalformedInputError;

pub const NAME: &str = "Plain Text";

/// Returns the entire buffer as a single byte-string scalar. Never fails.
pub struct PlainTextDissector {
    descriptor: DissectorDescriptor,
}

impl PlainTextDissector {
    pub fn new() -> Self {
        Self {
            descriptor: DissectorDescriptor::new(NAME, [".txt"], ["text/plain"]),
        }
    }
}

impl Default for PlainTextDissector {
    fn default() -> Self {
        Self::new()
    }
}

impl Dissector for PlainTextDissector {
    fn descriptor(&self) -> &DissectorDescriptor {
        &self.descriptor
    }

    fn dissect(&self, data: &[u8]) -> Result<StructuredValue, MalformedInputError> {
        Ok(StructuredValue::Scalar(Scalar::Bytes(data.to_vec())))
    }
}
