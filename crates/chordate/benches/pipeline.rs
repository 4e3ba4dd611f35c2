use chordate::render::{LayoutOptions, SvgRenderOptions, render_layouted_svg, sanitize_svg_id};
use chordate_core::{Engine, ParseOptions};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};

fn fixtures() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "chord",
            r#"{
  "kind": "chord",
  "title": "Team network",
  "nodes": [
    { "id": "n1", "label": "Amara", "tags": ["core", "backend"] },
    { "id": "n2", "label": "Bruno", "tags": ["core", "frontend"] },
    { "id": "n3", "label": "Carol", "tags": ["guest", "backend"] },
    { "id": "n4", "label": "Dmitri", "tags": ["guest", "frontend"] }
  ]
}"#,
        ),
        (
            "chord-connections",
            r#"{
  "kind": "chord",
  "nodes": [
    { "id": "n1", "label": "Amara", "tags": ["core"] },
    { "id": "n2", "label": "Bruno", "tags": ["core"] },
    { "id": "n3", "label": "Carol", "tags": ["guest"] }
  ],
  "connections": [
    { "id": "c1", "source": "n1", "destination": "n3" },
    { "id": "c2", "source": "n2", "destination": "n2" },
    { "id": "c3", "source": "n3", "destination": "n1" }
  ]
}"#,
        ),
        (
            "bar",
            r#"{
  "kind": "barChart",
  "title": "Releases per quarter",
  "bars": [
    { "id": "q1", "label": "Q1", "count": 4 },
    { "id": "q2", "label": "Q2", "count": 8 },
    { "id": "q3", "label": "Q3", "count": 2 },
    { "id": "q4", "label": "Q4", "count": 6 }
  ]
}"#,
        ),
    ]
}

fn bench_render_svg_sync(c: &mut Criterion) {
    let engine = Engine::new();
    let parse_opts = ParseOptions::default();
    let layout = LayoutOptions::default();

    let mut group = c.benchmark_group("render_svg_sync");
    for (name, input) in fixtures() {
        let diagram_id = sanitize_svg_id(name);
        group.bench_function(name, |b| {
            b.iter_batched(
                || input,
                |text| {
                    let Some(parsed) = engine.parse_chart_sync(text, parse_opts).unwrap() else {
                        return;
                    };
                    let chart = chordate_render::layout_parsed(&parsed, &layout).unwrap();
                    let svg_opts = SvgRenderOptions {
                        diagram_id: Some(diagram_id.clone()),
                        ..SvgRenderOptions::default()
                    };
                    let _svg = render_layouted_svg(&chart, &svg_opts);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_parse_only_sync(c: &mut Criterion) {
    let engine = Engine::new();
    let parse_opts = ParseOptions::default();

    let mut group = c.benchmark_group("parse_only_sync");
    for (name, input) in fixtures() {
        group.bench_function(name, |b| {
            b.iter(|| {
                let _ = engine.parse_chart_sync(input, parse_opts).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_layout_only_sync(c: &mut Criterion) {
    let engine = Engine::new();
    let parse_opts = ParseOptions::default();
    let layout = LayoutOptions::default();

    let mut group = c.benchmark_group("layout_only_sync");
    for (name, input) in fixtures() {
        let Some(parsed) = engine.parse_chart_sync(input, parse_opts).unwrap() else {
            continue;
        };
        group.bench_function(name, |b| {
            b.iter(|| {
                let _ = chordate_render::layout_parsed(&parsed, &layout).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_only_sync,
    bench_layout_only_sync,
    bench_render_svg_sync
);
criterion_main!(benches);
