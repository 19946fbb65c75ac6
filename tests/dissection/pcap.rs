use parslither::dissect::pcap::TcpdumpDissector;
use parslither::{project, Dissector};

use crate::common::pcap_capture;

#[test]
fn capture_projects_header_and_packets() {
    let data = pcap_capture(&[(1, 250, &b"GET /"[..]), (2, 0, &[0xffu8, 0x00][..])]);
    let value = TcpdumpDissector::new().dissect(&data).unwrap();
    let tree = project(&value);

    let labels: Vec<&str> = tree.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, ["header", "packets[0]", "packets[1]"]);

    let header = &tree[0];
    assert_eq!(header.child("link_type").unwrap().value, "ETHERNET");
    assert_eq!(header.child("snaplen").unwrap().value, "65535");

    let first = &tree[1];
    assert_eq!(first.child("data").unwrap().value, "GET /");
    assert_eq!(first.child("time").unwrap().value, "1970-01-01T00:00:01.000250Z");
    assert!(first.child("_offset").is_none());
    assert_eq!(tree[2].child("data").unwrap().value, "0xff00");
}

#[test]
fn truncated_marker_is_not_displayed() {
    let mut data = pcap_capture(&[(1, 0, &b"ok"[..])]);
    data.extend_from_slice(&[0u8; 7]);
    let value = TcpdumpDissector::new().dissect(&data).unwrap();
    assert!(value.field("_truncated_at").is_some());
    let tree = project(&value);
    assert_eq!(tree.len(), 2);
    assert!(tree.iter().all(|n| !n.label.starts_with('_')));
}

#[test]
fn arbitrary_prefixes_never_panic() {
    let data = pcap_capture(&[(1, 0, &b"abcdef"[..]), (2, 0, &b"ghij"[..])]);
    let dissector = TcpdumpDissector::new();
    for len in 0..=data.len() {
        let _ = dissector.dissect(&data[..len]);
    }
}
