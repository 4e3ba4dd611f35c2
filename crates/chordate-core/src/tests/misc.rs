use crate::*;
use serde_json::json;

#[test]
fn config_get_and_set_follow_dotted_paths() {
    let mut cfg = ChartConfig::empty_object();
    cfg.set_value("chord.labelOffset", json!(100.0));
    cfg.set_value("chord.nested.deep", json!("v"));
    assert_eq!(cfg.get_f64("chord.labelOffset"), Some(100.0));
    assert_eq!(cfg.get_str("chord.nested.deep"), Some("v"));
    assert_eq!(cfg.get_f64("chord.missing"), None);
}

#[test]
fn config_set_coerces_non_object_slots() {
    let mut cfg = ChartConfig::from_value(json!("scalar"));
    cfg.set_value("a.b", json!(1));
    assert_eq!(cfg.as_value(), &json!({ "a": { "b": 1 } }));

    let mut cfg = ChartConfig::empty_object();
    cfg.set_value("a", json!(5));
    cfg.set_value("a.b", json!(1));
    assert_eq!(cfg.as_value(), &json!({ "a": { "b": 1 } }));
}

#[test]
fn deep_merge_overrides_leaves_and_keeps_siblings() {
    let mut base = ChartConfig::from_value(json!({
        "chord": { "labelOffset": 120.0, "bandThickness": 30.0 },
        "fontSize": 16.0
    }));
    base.deep_merge(&json!({ "chord": { "labelOffset": 90.0 } }));
    assert_eq!(
        base.as_value(),
        &json!({
            "chord": { "labelOffset": 90.0, "bandThickness": 30.0 },
            "fontSize": 16.0
        })
    );
}

#[test]
fn default_site_config_carries_chart_defaults() {
    let cfg = default_site_config();
    assert_eq!(cfg.get_f64("chord.labelOffset"), Some(120.0));
    assert_eq!(cfg.get_f64("barChart.labelOffset"), Some(20.0));
    assert_eq!(cfg.get_f64("chord.width"), Some(800.0));
    assert_eq!(cfg.get_f64("fontSize"), Some(16.0));
}
