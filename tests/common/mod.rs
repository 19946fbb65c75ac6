//! Common test utilities and helpers.

use std::io::Write;
use std::sync::Arc;

use parslither::dissect::pcap::MAGIC_MICROS;
use parslither::{
    DissectorDescriptor, DissectorRef, Dissector, MalformedInputError, StructuredValue,
};
use tempfile::NamedTempFile;

/// Creates a temporary file with the given content.
pub fn create_temp_file(content: &[u8]) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content).unwrap();
    temp_file
}

/// Little-endian microsecond capture with an Ethernet link type.
pub fn pcap_capture(packets: &[(u32, u32, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC_MICROS.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&65535u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    for (sec, usec, payload) in packets {
        out.extend_from_slice(&sec.to_le_bytes());
        out.extend_from_slice(&usec.to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
    }
    out
}

/// Dissector stub returning a fixed value; the value's `tag` field names it.
pub struct Stub {
    descriptor: DissectorDescriptor,
    tag: String,
}

impl Stub {
    pub fn arc(name: &str, tag: &str, exts: &[&str], mimes: &[&str]) -> DissectorRef {
        Arc::new(Self {
            descriptor: DissectorDescriptor::new(name, exts.iter().copied(), mimes.iter().copied()),
            tag: tag.to_string(),
        })
    }
}

impl Dissector for Stub {
    fn descriptor(&self) -> &DissectorDescriptor {
        &self.descriptor
    }

    fn dissect(&self, data: &[u8]) -> Result<StructuredValue, MalformedInputError> {
        Ok(parslither::Container::new()
            .with("tag", self.tag.as_str())
            .with("size", data.len() as u64)
            .into())
    }
}
