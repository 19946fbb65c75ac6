//! libpcap ("tcpdump") capture file dissector.
//!
//! Layout: a 24-byte global header followed by packet records, each a
//! 16-byte record header and `incl_len` bytes of captured data. The magic
//! number selects byte order and timestamp resolution.

use chrono::{DateTime, SecondsFormat};
use tracing::{debug, warn};

use crate::check_cancelled;
use crate::core::{Container, DissectorDescriptor, StructuredValue};
use crate::dissect::Dissector;
use crate::error::{DissectError, MalformedInputError, Result};
use crate::timeout::{CancelToken, IterationGuard};

pub const NAME: &str = "TCPDump capture";
pub const MEDIA_TYPE: &str = "application/vnd.tcpdump.pcap";

pub const GLOBAL_HEADER_LEN: usize = 24;
pub const RECORD_HEADER_LEN: usize = 16;

pub const MAGIC_MICROS: u32 = 0xa1b2_c3d4;
pub const MAGIC_NANOS: u32 = 0xa1b2_3c4d;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn as_str(&self) -> &'static str {
        match self {
            ByteOrder::Little => "little",
            ByteOrder::Big => "big",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Micros,
    Nanos,
}

impl Resolution {
    fn as_str(&self) -> &'static str {
        match self {
            Resolution::Micros => "microseconds",
            Resolution::Nanos => "nanoseconds",
        }
    }

    fn fraction_field(&self) -> &'static str {
        match self {
            Resolution::Micros => "ts_usec",
            Resolution::Nanos => "ts_nsec",
        }
    }
}

/// Identifies byte order and resolution from the first four bytes.
pub fn detect_magic(data: &[u8]) -> Option<(ByteOrder, Resolution)> {
    let raw: [u8; 4] = data.get(..4)?.try_into().ok()?;
    let le = u32::from_le_bytes(raw);
    let be = u32::from_be_bytes(raw);
    match (le, be) {
        (MAGIC_MICROS, _) => Some((ByteOrder::Little, Resolution::Micros)),
        (MAGIC_NANOS, _) => Some((ByteOrder::Little, Resolution::Nanos)),
        (_, MAGIC_MICROS) => Some((ByteOrder::Big, Resolution::Micros)),
        (_, MAGIC_NANOS) => Some((ByteOrder::Big, Resolution::Nanos)),
        _ => None,
    }
}

fn read_u16(data: &[u8], offset: usize, order: ByteOrder) -> Option<u16> {
    let raw: [u8; 2] = data.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
    Some(match order {
        ByteOrder::Little => u16::from_le_bytes(raw),
        ByteOrder::Big => u16::from_be_bytes(raw),
    })
}

fn read_u32(data: &[u8], offset: usize, order: ByteOrder) -> Option<u32> {
    let raw: [u8; 4] = data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
    Some(match order {
        ByteOrder::Little => u32::from_le_bytes(raw),
        ByteOrder::Big => u32::from_be_bytes(raw),
    })
}

/// Common link-layer header type names.
pub fn link_type_name(network: u32) -> &'static str {
    match network {
        0 => "NULL",
        1 => "ETHERNET",
        6 => "IEEE802_5",
        9 => "PPP",
        101 => "RAW",
        105 => "IEEE802_11",
        113 => "LINUX_SLL",
        127 => "IEEE802_11_RADIOTAP",
        228 => "IPV4",
        229 => "IPV6",
        276 => "LINUX_SLL2",
        _ => "UNKNOWN",
    }
}

fn format_time(ts_sec: u32, ts_frac: u32, resolution: Resolution) -> String {
    let (nanos, format) = match resolution {
        Resolution::Micros => (ts_frac.checked_mul(1_000), SecondsFormat::Micros),
        Resolution::Nanos => (Some(ts_frac), SecondsFormat::Nanos),
    };
    nanos
        .filter(|n| *n < 1_000_000_000)
        .and_then(|n| DateTime::from_timestamp(i64::from(ts_sec), n))
        .map(|t| t.to_rfc3339_opts(format, true))
        .unwrap_or_else(|| "invalid".to_string())
}

/// Dissector for `.cap` / `.pcap` / `.tcpdump` captures.
pub struct TcpdumpDissector {
    descriptor: DissectorDescriptor,
}

impl TcpdumpDissector {
    pub fn new() -> Self {
        Self {
            descriptor: DissectorDescriptor::new(
                NAME,
                [".cap", ".pcap", ".tcpdump"],
                [MEDIA_TYPE],
            ),
        }
    }

    fn malformed(offset: usize, message: impl Into<String>) -> MalformedInputError {
        MalformedInputError::at(NAME, offset as u64, message)
    }

    fn parse_global_header(
        data: &[u8],
    ) -> std::result::Result<(Container, ByteOrder, Resolution), MalformedInputError> {
        if data.len() < GLOBAL_HEADER_LEN {
            return Err(Self::malformed(
                data.len(),
                format!(
                    "input is {} bytes, shorter than the {}-byte global header",
                    data.len(),
                    GLOBAL_HEADER_LEN
                ),
            ));
        }
        let (order, resolution) =
            detect_magic(data).ok_or_else(|| Self::malformed(0, "unrecognized capture magic"))?;

        // Length was checked above, so these reads cannot come up short.
        let u32_at = |offset| read_u32(data, offset, order).unwrap_or_default();
        let u16_at = |offset| read_u16(data, offset, order).unwrap_or_default();
        let magic = u32_at(0);
        let version_major = u16_at(4);
        let version_minor = u16_at(6);
        let thiszone = u32_at(8) as i32;
        let sigfigs = u32_at(12);
        let snaplen = u32_at(16);
        let network = u32_at(20);

        let header = Container::new()
            .with("magic", format!("{:#010x}", magic))
            .with("byte_order", order.as_str())
            .with("timestamp_resolution", resolution.as_str())
            .with("version_major", version_major)
            .with("version_minor", version_minor)
            .with("thiszone", thiszone)
            .with("sigfigs", sigfigs)
            .with("snaplen", snaplen)
            .with("network", network)
            .with("link_type", link_type_name(network));

        Ok((header, order, resolution))
    }

    fn parse(&self, data: &[u8], guard: &mut IterationGuard) -> Result<StructuredValue> {
        let (header, order, resolution) = Self::parse_global_header(data)?;

        let mut packets = Vec::new();
        let mut truncated_at = None;
        let mut offset = GLOBAL_HEADER_LEN;

        while offset < data.len() {
            check_cancelled!(guard, "pcap record loop");

            let record = (
                read_u32(data, offset, order),
                read_u32(data, offset + 4, order),
                read_u32(data, offset + 8, order),
                read_u32(data, offset + 12, order),
            );
            let (Some(ts_sec), Some(ts_frac), Some(incl_len), Some(orig_len)) = record else {
                truncated_at = Some(offset);
                break;
            };

            let start = offset + RECORD_HEADER_LEN;
            let end = match start.checked_add(incl_len as usize) {
                Some(end) if end <= data.len() => end,
                _ => {
                    truncated_at = Some(offset);
                    break;
                }
            };

            let packet = Container::new()
                .with("time", format_time(ts_sec, ts_frac, resolution))
                .with("ts_sec", ts_sec)
                .with(resolution.fraction_field(), ts_frac)
                .with("length", incl_len)
                .with("original_length", orig_len)
                .with("data", &data[start..end])
                .with("_offset", offset as u64);
            packets.push(StructuredValue::Container(packet));
            offset = end;
        }

        if let Some(at) = truncated_at {
            warn!(
                dissector = NAME,
                offset = at,
                packets = packets.len(),
                "Capture ends in a truncated record"
            );
        }
        debug!(dissector = NAME, packets = packets.len(), "Capture dissected");

        let packet_count = packets.len() as u64;
        let mut root = Container::new()
            .with("header", header)
            .with("packets", packets)
            .with("_packet_count", packet_count);
        if let Some(at) = truncated_at {
            root.insert("_truncated_at", at as u64);
        }
        Ok(StructuredValue::Container(root))
    }
}

impl Default for TcpdumpDissector {
    fn default() -> Self {
        Self::new()
    }
}

impl Dissector for TcpdumpDissector {
    fn descriptor(&self) -> &DissectorDescriptor {
        &self.descriptor
    }

    fn dissect(&self, data: &[u8]) -> std::result::Result<StructuredValue, MalformedInputError> {
        let mut guard = IterationGuard::new(NAME);
        self.parse(data, &mut guard).map_err(|e| match e {
            DissectError::Malformed(m) => m,
            other => MalformedInputError::new(NAME, other.to_string()),
        })
    }

    fn dissect_cancellable(&self, data: &[u8], cancel: &CancelToken) -> Result<StructuredValue> {
        cancel.check()?;
        let mut guard = IterationGuard::new(NAME)
            .with_check_interval(64)
            .with_cancel(cancel.clone());
        self.parse(data, &mut guard)
    }
}
