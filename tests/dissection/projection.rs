use parslither::export::{from_json_str, to_json_string, to_readable_text};
use parslither::{project, Container, DisplayNode, StructuredValue};

fn sample() -> StructuredValue {
    Container::new()
        .with(
            "header",
            Container::new()
                .with("version", 2u32)
                .with("_raw", &b"\x00\x01"[..]),
        )
        .with(
            "records",
            vec![
                StructuredValue::Container(Container::new().with("id", 1u32)),
                StructuredValue::Container(Container::new().with("id", 2u32)),
            ],
        )
        .with("note", "done")
        .into()
}

#[test]
fn projection_matches_expected_tree() {
    let expected = vec![
        DisplayNode::header("header", vec![DisplayNode::leaf("version", "2")]),
        DisplayNode::header("records[0]", vec![DisplayNode::leaf("id", "1")]),
        DisplayNode::header("records[1]", vec![DisplayNode::leaf("id", "2")]),
        DisplayNode::leaf("note", "done"),
    ];
    assert_eq!(project(&sample()), expected);
}

#[test]
fn projection_survives_json_round_trip_of_value() {
    let value = sample();
    let json = value.to_json_string().unwrap();
    let back = StructuredValue::from_json_str(&json).unwrap();
    assert_eq!(project(&back), project(&value));
}

#[test]
fn readable_export_of_projected_tree() {
    let text = to_readable_text(&project(&sample()));
    assert_eq!(
        text,
        "header\n  version: 2\nrecords[0]\n  id: 1\nrecords[1]\n  id: 2\nnote: done\n"
    );
}

#[test]
fn json_export_is_loadable() {
    let nodes = project(&sample());
    let back = from_json_str(&to_json_string(&nodes).unwrap()).unwrap();
    assert_eq!(back, nodes);
}
