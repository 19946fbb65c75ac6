use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parslither::sniff::{ContentSniffer, MediaTypeSniffer};
use parslither::{builtin_dissectors, DissectConfig, DissectionSession, DissectorRegistry};

use crate::common::{pcap_capture, Stub};

#[test]
fn extension_match_wins_over_media_type() {
    let registry = DissectorRegistry::with_dissectors(vec![
        Stub::arc("A", "a", &[".x"], &[]),
        Stub::arc("B", "b", &[], &["type/y"]),
    ])
    .unwrap();

    let sniffed = Cell::new(false);
    let chosen = registry.select_for_file("f.x", || {
        sniffed.set(true);
        Some("type/y".to_string())
    });
    assert_eq!(chosen.unwrap().name(), "A");
    assert!(!sniffed.get(), "sniffer must not run when the extension matches");
}

#[test]
fn media_type_fallback_and_no_match() {
    let registry = DissectorRegistry::with_dissectors(vec![
        Stub::arc("A", "a", &[".x"], &[]),
        Stub::arc("B", "b", &[], &["type/y"]),
    ])
    .unwrap();

    let chosen = registry.select_for_file("f.z", || Some("type/y".to_string()));
    assert_eq!(chosen.unwrap().name(), "B");
    assert!(registry.select_for_file("f.z", || None).is_none());
    assert!(registry
        .select_for_file("f.z", || Some("type/other".to_string()))
        .is_none());
}

#[test]
fn registration_order_breaks_ties() {
    let registry = DissectorRegistry::with_dissectors(vec![
        Stub::arc("First", "1", &[".dup"], &["m/dup"]),
        Stub::arc("Second", "2", &[".dup"], &["m/dup"]),
    ])
    .unwrap();
    assert_eq!(registry.select_for_file("a.dup", || None).unwrap().name(), "First");
    assert_eq!(
        registry
            .select_for_file("noext", || Some("m/dup".to_string()))
            .unwrap()
            .name(),
        "First"
    );
}

#[test]
fn content_sniffing_selects_capture_without_extension() {
    let registry = Arc::new(DissectorRegistry::with_builtins());
    let mut session = DissectionSession::from_config(registry, &DissectConfig::default());
    session.load_file(pcap_capture(&[(1, 0, &b"abc"[..])]), "capture_dump");
    assert_eq!(session.active_dissector_name(), Some("TCPDump capture"));
    assert!(session.tree().is_some());
}

#[test]
fn content_sniffer_reports_text_and_capture() {
    let sniffer = ContentSniffer::default();
    assert_eq!(
        sniffer.media_type_of("x", b"plain words\n").as_deref(),
        Some("text/plain")
    );
    assert_eq!(
        sniffer.media_type_of("x", &pcap_capture(&[])).as_deref(),
        Some("application/vnd.tcpdump.pcap")
    );
    assert_eq!(sniffer.media_type_of("x", &[0u8, 1, 2, 0xff]), None);
}

#[test]
fn extension_fallback_is_opt_in() {
    let registry = Arc::new(DissectorRegistry::with_builtins());
    let binary = vec![0u8, 1, 2, 3];

    let mut session = DissectionSession::from_config(Arc::clone(&registry), &DissectConfig::default());
    session.load_file(binary.clone(), "notes.text");
    assert!(session.active_dissector().is_none());

    let mut config = DissectConfig::default();
    config.sniff.extension_fallback = true;
    let mut session = DissectionSession::from_config(registry, &config);
    session.load_file(binary, "notes.text");
    assert_eq!(session.active_dissector_name(), Some("Plain Text"));
}

#[test]
fn snapshot_survives_reload() {
    let registry = DissectorRegistry::with_builtins();
    let before = registry.snapshot();
    registry
        .reload(vec![Stub::arc("Only", "o", &[".o"], &[])])
        .unwrap();
    assert_eq!(before.names(), ["Plain Text", "TCPDump capture"]);
    assert_eq!(registry.names(), ["Only"]);
}

#[test]
fn concurrent_reload_never_exposes_a_mixed_set() {
    let registry = Arc::new(DissectorRegistry::with_builtins());
    let builtins = ["Plain Text", "TCPDump capture"];
    let only = ["Only"];
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..500 {
                let set = if i % 2 == 0 {
                    vec![Stub::arc("Only", "o", &[".o"], &[])]
                } else {
                    builtin_dissectors()
                };
                registry.reload(set).unwrap();
            }
            done.store(true, Ordering::Release);
        });

        for _ in 0..4 {
            scope.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let names = registry.names();
                    assert!(names == builtins || names == only, "mixed set: {:?}", names);

                    let snapshot = registry.snapshot();
                    let chosen = snapshot
                        .select_for_file("a.txt", || None)
                        .map(|d| d.name().to_string());
                    if snapshot.names() == builtins {
                        assert_eq!(chosen.as_deref(), Some("Plain Text"));
                    } else {
                        assert_eq!(snapshot.names(), only);
                        assert_eq!(chosen, None);
                    }
                }
            });
        }
    });

    assert_eq!(registry.names(), builtins);
}
