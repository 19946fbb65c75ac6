#![no_main]
use libfuzzer_sys::fuzz_target;
use parslither::dissect::pcap::TcpdumpDissector;
use parslither::{project, Dissector};

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = TcpdumpDissector::new().dissect(data) {
        let _ = project(&value);
    }
});
