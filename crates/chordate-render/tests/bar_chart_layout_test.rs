use chordate_core::{Engine, LinearScale, ParseOptions};
use chordate_render::{BarChartLayout, LayoutChart, LayoutOptions, SvgRenderOptions, layout_parsed, render_svg};
use futures::executor::block_on;
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn load_fixture(rel: &str) -> String {
    let path = workspace_root().join("fixtures").join(rel);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

fn bar_layout(text: &str) -> BarChartLayout {
    let engine = Engine::new();
    let parsed = block_on(engine.parse_chart(text, ParseOptions::strict()))
        .expect("parse ok")
        .expect("chart detected");
    let out = layout_parsed(&parsed, &LayoutOptions::default()).expect("layout ok");
    let LayoutChart::Bar(layout) = out.layout else {
        panic!("expected a bar chart layout");
    };
    layout
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "{what}: {actual} != {expected}"
    );
}

// Label strip under the plot: offset plus one line of text at defaults.
fn default_plot_height() -> f64 {
    600.0 - 20.0 - 1.0 * 16.0 * 1.2
}

#[test]
fn bars_fill_their_slots_bottom_aligned() {
    let layout = bar_layout(&load_fixture("barchart/basic.json"));

    assert_eq!(layout.width, 800.0);
    assert_eq!(layout.height, 600.0);
    assert_eq!(layout.bars.len(), 3);

    let plot_height = default_plot_height();
    let scale = LinearScale::new(0.0, 8.0, 0.0, plot_height);
    let slot = 800.0 / 3.0;
    let bar_width = slot * 0.7;

    for (i, bar) in layout.bars.iter().enumerate() {
        assert_close(bar.width, bar_width, "bar width");
        assert_close(bar.x, i as f64 * slot + (slot - bar_width) / 2.0, "bar x");
        assert_close(bar.y + bar.height, plot_height, "bar bottom");
    }

    assert_close(layout.bars[0].height, scale.map(4.0), "q1 height");
    assert_close(layout.bars[1].height, plot_height, "q2 fills the plot");
    assert_close(layout.bars[1].y, 0.0, "q2 top");
    assert_close(layout.bars[2].height, scale.map(2.0), "q3 height");
}

#[test]
fn bar_colors_mix_supplied_and_palette() {
    let layout = bar_layout(&load_fixture("barchart/basic.json"));

    // q2 brings its own color; the others take palette slots in order.
    assert_eq!(layout.bars[0].color, "#1f77b4");
    assert_eq!(layout.bars[1].color, "#2ca02c");
    assert_eq!(layout.bars[2].color, "#ff7f0e");
}

#[test]
fn labels_sit_centered_under_the_plot() {
    let layout = bar_layout(&load_fixture("barchart/basic.json"));

    let plot_height = default_plot_height();
    let slot = 800.0 / 3.0;
    for (i, bar) in layout.bars.iter().enumerate() {
        assert_close(bar.label_x, i as f64 * slot + slot / 2.0, "label x");
        assert_close(bar.label_y, plot_height + 20.0, "label y");
    }
    assert_eq!(layout.bars[0].display_label, "Q1");
}

#[test]
fn long_bar_labels_shed_characters() {
    let text = format!(
        r#"{{"kind":"barChart","bars":[
            {{"id":"b1","label":"{}","count":1}},
            {{"id":"b2","label":"ok","count":2}}
        ]}}"#,
        "release train ".repeat(8).trim_end()
    );
    let layout = bar_layout(&text);

    let long = &layout.bars[0];
    assert!(long.display_label.ends_with("..."), "{}", long.display_label);
    assert!(long.display_label.len() < long.label.len());
    assert_eq!(layout.bars[1].display_label, "ok");
}

#[test]
fn zero_counts_make_zero_height_bars() {
    let layout = bar_layout(
        r#"{"kind":"barChart","bars":[
            {"id":"b1","label":"A","count":0},
            {"id":"b2","label":"B"}
        ]}"#,
    );

    let plot_height = default_plot_height();
    for bar in &layout.bars {
        assert_close(bar.height, 0.0, "zero height");
        assert_close(bar.y, plot_height, "rests on the baseline");
    }
}

#[test]
fn empty_bar_list_is_a_valid_chart() {
    let layout = bar_layout(r#"{"kind":"barChart","bars":[]}"#);
    assert!(layout.bars.is_empty());
    assert_eq!(layout.width, 800.0);
    assert_eq!(layout.height, 600.0);
}

#[test]
fn bar_chart_svg_smoke() {
    let engine = Engine::new();
    let parsed = block_on(engine.parse_chart(
        &load_fixture("barchart/basic.json"),
        ParseOptions::strict(),
    ))
    .expect("parse ok")
    .expect("chart detected");
    let out = layout_parsed(&parsed, &LayoutOptions::default()).expect("layout ok");
    let svg = render_svg(&out, &SvgRenderOptions::default());

    assert!(svg.contains(r#"aria-roledescription="barChart""#), "{svg}");
    assert_eq!(svg.matches("<rect ").count(), 3);
    assert_eq!(svg.matches("bar-chart-rect-label\"").count(), 3);
    assert!(svg.contains(r##"fill="#2ca02c""##));
    assert!(svg.contains("Releases per quarter"));
    assert!(svg.contains(r#"<g class="bar-chart-rect-graphics">"#));
    assert!(svg.ends_with("</svg>"));
}
