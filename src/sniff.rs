//! Media type sniffers used by the registry's second selection pass.
//!
//! `ContentSniffer` looks at the bytes only (`infer`, plus matchers for
//! captures and plain text), `ExtensionSniffer` guesses from the file name
//! (`mime_guess`), and `CombinedSniffer` asks a chain in order.

use tracing::{debug, trace};

use crate::config::SniffConfig;
use crate::core::is_text_whitespace;
use crate::dissect::pcap;

/// Answers "what media type is this file?".
pub trait MediaTypeSniffer: Send + Sync {
    fn media_type_of(&self, file_name: &str, data: &[u8]) -> Option<String>;
}

impl<F> MediaTypeSniffer for F
where
    F: Fn(&str, &[u8]) -> Option<String> + Send + Sync,
{
    fn media_type_of(&self, file_name: &str, data: &[u8]) -> Option<String> {
        self(file_name, data)
    }
}

/// Sniffer that never reports a media type.
pub struct NullSniffer;

impl MediaTypeSniffer for NullSniffer {
    fn media_type_of(&self, _file_name: &str, _data: &[u8]) -> Option<String> {
        None
    }
}

fn pcap_matcher(buf: &[u8]) -> bool {
    pcap::detect_magic(buf).is_some()
}

/// True when `prefix` decodes as UTF-8 (allowing a character cut at the end)
/// and holds no control characters besides tab, newline and carriage return.
pub fn looks_like_text(prefix: &[u8]) -> bool {
    if prefix.is_empty() {
        return false;
    }
    let text = match std::str::from_utf8(prefix) {
        Ok(t) => t,
        // Prefix ended inside a multi-byte character.
        Err(e) if e.error_len().is_none() => {
            match std::str::from_utf8(&prefix[..e.valid_up_to()]) {
                Ok(t) => t,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };
    !text
        .chars()
        .any(|c| c.is_control() && !is_text_whitespace(c))
}

/// Content-based detection over a bounded prefix.
pub struct ContentSniffer {
    infer: infer::Infer,
    max_sniff_size: usize,
}

impl ContentSniffer {
    pub fn new(max_sniff_size: usize) -> Self {
        let mut infer = infer::Infer::new();
        infer.add(pcap::MEDIA_TYPE, "pcap", pcap_matcher);
        Self {
            infer,
            max_sniff_size,
        }
    }

    /// Sniff a byte slice, ignoring anything past the configured prefix size.
    pub fn sniff_bytes(&self, data: &[u8]) -> Option<String> {
        let prefix = &data[..data.len().min(self.max_sniff_size)];
        trace!("Sniffing {} bytes of content", prefix.len());

        if let Some(kind) = self.infer.get(prefix) {
            debug!(
                "Content detected as {} ({})",
                kind.mime_type(),
                kind.extension()
            );
            return Some(kind.mime_type().to_string());
        }
        if looks_like_text(prefix) {
            debug!("Content detected as text/plain");
            return Some("text/plain".to_string());
        }
        debug!("No content type detected from {} bytes", prefix.len());
        None
    }
}

impl Default for ContentSniffer {
    fn default() -> Self {
        Self::new(SniffConfig::default().max_sniff_size)
    }
}

impl MediaTypeSniffer for ContentSniffer {
    fn media_type_of(&self, _file_name: &str, data: &[u8]) -> Option<String> {
        self.sniff_bytes(data)
    }
}

/// Name-based guess from the file extension.
pub struct ExtensionSniffer;

impl MediaTypeSniffer for ExtensionSniffer {
    fn media_type_of(&self, file_name: &str, _data: &[u8]) -> Option<String> {
        let guess = mime_guess::from_path(file_name).first()?;
        debug!(file = %file_name, mime = %guess, "Media type guessed from extension");
        Some(guess.to_string())
    }
}

/// Asks each sniffer in order; the first answer wins.
pub struct CombinedSniffer {
    sniffers: Vec<Box<dyn MediaTypeSniffer>>,
}

impl CombinedSniffer {
    pub fn new(sniffers: Vec<Box<dyn MediaTypeSniffer>>) -> Self {
        Self { sniffers }
    }

    /// Content sniffing first, then the extension guess when enabled.
    pub fn from_config(config: &SniffConfig) -> Self {
        let mut sniffers: Vec<Box<dyn MediaTypeSniffer>> =
            vec![Box::new(ContentSniffer::new(config.max_sniff_size))];
        if config.extension_fallback {
            sniffers.push(Box::new(ExtensionSniffer));
        }
        Self::new(sniffers)
    }
}

impl MediaTypeSniffer for CombinedSniffer {
    fn media_type_of(&self, file_name: &str, data: &[u8]) -> Option<String> {
        self.sniffers
            .iter()
            .find_map(|s| s.media_type_of(file_name, data))
    }
}
