use std::sync::Arc;

use parslither::dissect::builtin_dissectors;
use parslither::sniff::NullSniffer;
use parslither::{
    DissectError, DissectionOutcome, DissectionSession, DisplayNode, DissectorRegistry,
};

use crate::common::{pcap_capture, Stub};

fn session_with(dissectors: Vec<parslither::DissectorRef>) -> DissectionSession {
    let registry = Arc::new(DissectorRegistry::with_dissectors(dissectors).unwrap());
    DissectionSession::new(registry, Box::new(NullSniffer))
}

#[test]
fn plain_text_file_shows_single_row() {
    let mut session = session_with(builtin_dissectors());
    assert_eq!(
        session.load_file(&b"hi"[..], "notes.txt"),
        DissectionOutcome::Dissected { nodes: 1 }
    );
    assert_eq!(session.tree().unwrap(), [DisplayNode::leaf("", "hi")]);
}

#[test]
fn short_capture_reports_failure_and_recovers() {
    let mut session = session_with(builtin_dissectors());
    let outcome = session.load_file(&[0xd4u8, 0xc3, 0xb2][..], "dump.cap");
    let DissectionOutcome::Failed(err) = &outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert_eq!(err.dissector, "TCPDump capture");
    assert!(session.tree().is_none());
    assert_eq!(session.last_error(), Some(err));

    let fixed = pcap_capture(&[(0, 0, &b"p"[..])]);
    assert!(matches!(
        session.on_data_changed(fixed, false),
        DissectionOutcome::Dissected { .. }
    ));
    assert!(session.last_error().is_none());
    let tree = session.tree().unwrap();
    assert_eq!(tree[0].label, "header");
    assert_eq!(tree[1].label, "packets[0]");
}

#[test]
fn manual_override_beats_auto_selection() {
    let mut session = session_with(vec![
        Stub::arc("A", "a", &[".x"], &[]),
        Stub::arc("B", "b", &[".y"], &[]),
    ]);
    session.load_file(&b"data"[..], "f.x");
    assert_eq!(session.tree().unwrap()[0].value, "a");

    session.set_dissector("B").unwrap();
    assert_eq!(session.active_dissector_name(), Some("B"));
    assert_eq!(session.tree().unwrap()[0].value, "b");

    assert!(matches!(
        session.set_dissector("C"),
        Err(DissectError::UnknownDissector(_))
    ));
    assert_eq!(session.tree().unwrap()[0].value, "b");
}

#[test]
fn loading_a_new_file_resets_override() {
    let mut session = session_with(vec![
        Stub::arc("A", "a", &[".x"], &[]),
        Stub::arc("B", "b", &[".y"], &[]),
    ]);
    session.load_file(&b"1"[..], "f.x");
    session.set_dissector("B").unwrap();
    session.load_file(&b"2"[..], "g.x");
    assert_eq!(session.active_dissector_name(), Some("A"));
    assert_eq!(session.file_name(), Some("g.x"));
}

#[test]
fn tree_edit_change_is_suppressed_once() {
    let mut session = session_with(vec![Stub::arc("A", "a", &[".x"], &[])]);
    session.load_file(&b"12"[..], "f.x");
    assert_eq!(session.tree().unwrap()[1].value, "2");

    session.suppress_next_change();
    assert_eq!(
        session.on_data_changed(&b"1234"[..], false),
        DissectionOutcome::Suppressed
    );
    assert_eq!(session.tree().unwrap()[1].value, "2");

    session.on_data_changed(&b"123456"[..], false);
    assert_eq!(session.tree().unwrap()[1].value, "6");
}

#[test]
fn reload_re_resolves_by_name() {
    let mut session = session_with(vec![Stub::arc("X", "old", &[".x"], &[])]);
    session.load_file(&b"abc"[..], "f.x");
    assert_eq!(session.tree().unwrap()[0].value, "old");

    session
        .reload_plugins(vec![Stub::arc("X", "new", &[".x"], &[])])
        .unwrap();
    assert_eq!(session.active_dissector_name(), Some("X"));
    assert_eq!(session.tree().unwrap()[0].value, "new");

    let outcome = session
        .reload_plugins(vec![Stub::arc("Y", "y", &[".x"], &[])])
        .unwrap();
    assert_eq!(outcome, DissectionOutcome::Unassigned);
    assert!(session.active_dissector().is_none());
    assert!(session.tree().is_none());
}

#[test]
fn reload_without_file_only_swaps_registry() {
    let mut session = session_with(builtin_dissectors());
    let outcome = session
        .reload_plugins(vec![Stub::arc("Z", "z", &[".z"], &[])])
        .unwrap();
    assert_eq!(outcome, DissectionOutcome::NoFile);
    assert_eq!(session.registry().names(), ["Z"]);
}
