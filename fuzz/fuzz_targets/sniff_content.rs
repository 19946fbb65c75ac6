#![no_main]
use libfuzzer_sys::fuzz_target;
use parslither::sniff::{ContentSniffer, MediaTypeSniffer};

fuzz_target!(|data: &[u8]| {
    let _ = ContentSniffer::default().media_type_of("<fuzz>", data);
});
