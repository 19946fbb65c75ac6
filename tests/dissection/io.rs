use std::sync::Arc;

use parslither::io::error::IoError;
use parslither::io::{load_file, IoLimits};
use parslither::{DissectConfig, DissectionOutcome, DissectionSession, DissectorRegistry};

use crate::common::{create_temp_file, pcap_capture};

#[test]
fn load_file_then_dissect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.pcap");
    std::fs::write(&path, pcap_capture(&[(5, 0, &b"pkt"[..])])).unwrap();

    let loaded = load_file(&path, IoLimits::default()).unwrap();
    assert_eq!(loaded.file_name, "trace.pcap");

    let mut session = DissectionSession::from_config(
        Arc::new(DissectorRegistry::with_builtins()),
        &DissectConfig::default(),
    );
    let outcome = session.load_file(loaded.bytes, &loaded.file_name);
    assert!(matches!(outcome, DissectionOutcome::Dissected { .. }));
    assert_eq!(session.active_dissector_name(), Some("TCPDump capture"));
}

#[test]
fn oversized_file_is_rejected_before_dissection() {
    let file = create_temp_file(&[0u8; 128]);
    let limits = IoLimits {
        max_file_size: 64,
        max_read_bytes: 1024,
    };
    assert!(matches!(
        load_file(file.path(), limits),
        Err(IoError::FileTooLarge { .. })
    ));
}

#[test]
fn empty_file_loads_but_is_not_dissected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.txt");
    std::fs::write(&path, b"").unwrap();

    let loaded = load_file(&path, IoLimits::default()).unwrap();
    assert!(loaded.bytes.is_empty());
    let mut session = DissectionSession::from_config(
        Arc::new(DissectorRegistry::with_builtins()),
        &DissectConfig::default(),
    );
    assert_eq!(
        session.load_file(loaded.bytes, &loaded.file_name),
        DissectionOutcome::Empty
    );
}
