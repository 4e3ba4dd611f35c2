use crate::*;
use futures::executor::block_on;

fn chord_text() -> &'static str {
    r#"{
        "kind": "chord",
        "title": "deps",
        "nodes": [
            { "id": "a1", "tags": ["a", "x"], "label": "alpha", "assetRef": "def-node-private" },
            { "id": "a2", "tags": ["a", "y"], "label": "beta", "assetRef": "def-node-shared" },
            { "id": "b1", "tags": ["b", "x"], "label": "gamma", "assetRef": "def-node-private" }
        ]
    }"#
}

#[test]
fn parse_chart_chord_basic() {
    let engine = Engine::new();
    let res = block_on(engine.parse_chart(chord_text(), ParseOptions::default()))
        .unwrap()
        .unwrap();
    assert_eq!(res.meta.kind, "chord");
    assert_eq!(res.meta.title.as_deref(), Some("deps"));

    let chart = res.model.as_chord().unwrap();
    assert_eq!(chart.kind, "chord");
    assert_eq!(chart.nodes.len(), 3);
    assert_eq!(chart.nodes[0].primary_tag(), Some("a"));
    assert_eq!(chart.nodes[0].secondary_tag(), Some("x"));
    assert!(chart.connections.is_none());
}

#[test]
fn parse_chart_tolerates_missing_optional_node_fields() {
    let engine = Engine::new();
    let text = r#"{ "kind": "chord", "nodes": [ { "id": "n1" } ] }"#;
    let res = block_on(engine.parse_chart(text, ParseOptions::default()))
        .unwrap()
        .unwrap();
    let chart = res.model.as_chord().unwrap();
    assert_eq!(chart.nodes[0].primary_tag(), None);
    assert_eq!(chart.nodes[0].secondary_tag(), None);
    assert_eq!(chart.nodes[0].label, "");
    assert_eq!(chart.nodes[0].asset_ref, "");
}

#[test]
fn parse_chart_rejects_duplicate_node_ids() {
    let engine = Engine::new();
    let text = r#"{ "kind": "chord", "nodes": [ { "id": "n1" }, { "id": "n1" } ] }"#;
    let err = block_on(engine.parse_chart(text, ParseOptions::strict()))
        .unwrap_err()
        .to_string();
    assert_eq!(err, "Chart parse error (chord): duplicate record id: n1");
}

#[test]
fn lenient_parse_drops_duplicate_node_ids() {
    let engine = Engine::new();
    let text = r#"{ "kind": "chord", "nodes": [ { "id": "n1" }, { "id": "n1" } ] }"#;
    let res = block_on(engine.parse_chart(text, ParseOptions::lenient()))
        .unwrap()
        .unwrap();
    assert_eq!(res.model.as_chord().unwrap().nodes.len(), 1);
}

#[test]
fn parse_chart_resolves_supplied_connections() {
    let engine = Engine::new();
    let text = r#"{
        "kind": "chord",
        "nodes": [ { "id": "n1" }, { "id": "n2" } ],
        "connections": [
            { "id": "c1", "source": "n1", "destination": "n2" },
            { "id": "c2", "source": "n2", "destination": "n2", "attrs": { "stroke": "red" } }
        ]
    }"#;
    let res = block_on(engine.parse_chart(text, ParseOptions::default()))
        .unwrap()
        .unwrap();
    let chart = res.model.as_chord().unwrap();
    let connections = chart.connections.as_ref().unwrap();
    assert_eq!(connections.len(), 2);
    assert_eq!(connections[1].attrs.get("stroke").map(String::as_str), Some("red"));
}

#[test]
fn parse_chart_rejects_connection_to_unknown_node() {
    let engine = Engine::new();
    let text = r#"{
        "kind": "chord",
        "nodes": [ { "id": "n1" } ],
        "connections": [ { "id": "c1", "source": "n1", "destination": "ghost" } ]
    }"#;
    let err = block_on(engine.parse_chart(text, ParseOptions::strict()))
        .unwrap_err()
        .to_string();
    assert_eq!(
        err,
        "Chart parse error (chord): connection `c1` references unknown node `ghost`"
    );

    let res = block_on(engine.parse_chart(text, ParseOptions::lenient()))
        .unwrap()
        .unwrap();
    let chart = res.model.as_chord().unwrap();
    assert_eq!(chart.connections.as_ref().unwrap().len(), 0);
}

#[test]
fn parse_chart_bar_basic() {
    let engine = Engine::new();
    let text = r##"{
        "kind": "barChart",
        "bars": [
            { "id": "b1", "label": "one", "count": 10 },
            { "id": "b2", "label": "two", "count": 4, "color": "#12de93" }
        ]
    }"##;
    let res = block_on(engine.parse_chart(text, ParseOptions::default()))
        .unwrap()
        .unwrap();
    assert_eq!(res.meta.kind, "barChart");
    let chart = res.model.as_bar().unwrap();
    assert_eq!(chart.bars.len(), 2);
    assert_eq!(chart.bars[1].color.as_deref(), Some("#12de93"));
}

#[test]
fn parse_chart_rejects_negative_bar_counts() {
    let engine = Engine::new();
    let text = r#"{ "kind": "barChart", "bars": [ { "id": "b1", "count": -3 } ] }"#;
    let err = block_on(engine.parse_chart(text, ParseOptions::strict()))
        .unwrap_err()
        .to_string();
    assert_eq!(err, "Chart parse error (barChart): bar `b1` has invalid count -3");

    let res = block_on(engine.parse_chart(text, ParseOptions::lenient()))
        .unwrap()
        .unwrap();
    assert_eq!(res.model.as_bar().unwrap().bars.len(), 0);
}

#[test]
fn invalid_json_is_an_error_in_strict_mode_and_none_in_lenient() {
    let engine = Engine::new();
    assert!(block_on(engine.parse_chart("not json", ParseOptions::strict())).is_err());
    let res = block_on(engine.parse_chart("not json", ParseOptions::lenient())).unwrap();
    assert!(res.is_none());
}
