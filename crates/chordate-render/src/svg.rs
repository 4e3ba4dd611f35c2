//! Static SVG serialization of a populated scene.

use crate::model::{
    ArcSpan, BarChartLayout, Bounds, ChordDiagramLayout, LayoutChart, LayoutMeta, LayoutPoint,
    LayoutedChart,
};
use crate::scene::{BarChartComponent, ChordComponent, Scene, SceneElement, SceneGroup};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::f64::consts::{PI, TAU};
use std::fmt::Write as _;

const DEFAULT_FONT_FAMILY: &str = "helvetica, arial, sans-serif";
const DEFAULT_FONT_SIZE: f64 = 16.0;

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Padding added around the layout bounds when computing the viewBox.
    pub viewbox_padding: f64,
    /// `id` attribute of the root `<svg>` element; CSS rules are scoped to it.
    pub diagram_id: Option<String>,
    /// Background color of the root element. Defaults to white.
    pub background: Option<String>,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            viewbox_padding: 8.0,
            diagram_id: None,
            background: None,
        }
    }
}

/// Formats a float the way browsers print attribute values: integers without
/// a trailing `.0`, tiny magnitudes collapsed to zero.
pub(crate) fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = v;
    if v.abs() < 1e-9 {
        v = 0.0;
    }
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    let s = v.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

/// Formats a float for path data: at most three decimals, trailing zeros
/// trimmed.
pub(crate) fn fmt_path(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    if v.abs() < 0.0005 {
        return "0".to_string();
    }
    let r = ((v * 1000.0 + 0.5).floor()) / 1000.0;
    let mut s = format!("{r:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" { "0".to_string() } else { s }
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn polar_x(angle: f64, radius: f64) -> f64 {
    angle.sin() * radius
}

fn polar_y(angle: f64, radius: f64) -> f64 {
    -angle.cos() * radius
}

/// JSON array of `{x, y}` points, numbers through [`fmt`].
fn json_stringify_points(points: &[LayoutPoint]) -> String {
    let mut out = String::from("[");
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, r#"{{"x":{},"y":{}}}"#, fmt(p.x), fmt(p.y));
    }
    out.push(']');
    out
}

/// `data-points` attribute payload: Base64(JSON array of control points).
pub(crate) fn data_points_attr(points: &[LayoutPoint]) -> String {
    BASE64.encode(json_stringify_points(points))
}

/// `<defs>` symbol id a node graphic points at. Nodes without an asset
/// reference share one built-in glyph.
pub(crate) fn node_symbol_id(asset_ref: &str) -> String {
    if asset_ref.is_empty() {
        "chord-node-default".to_string()
    } else {
        asset_ref.to_string()
    }
}

/// Path data for one annular band segment, angles clockwise from 12 o'clock.
pub(crate) fn annular_arc_path(arc: &ArcSpan) -> String {
    let r0 = arc.inner_radius;
    let r1 = arc.outer_radius;
    let start = arc.start_angle;
    let span = arc.end_angle - arc.start_angle;

    if span >= TAU - 1e-9 {
        // Full ring: outer circle one way, inner circle the other so the
        // nonzero fill rule keeps the hole open.
        let (ox, oy) = (polar_x(start, r1), polar_y(start, r1));
        let (ix, iy) = (polar_x(start, r0), polar_y(start, r0));
        return format!(
            "M{},{}A{},{},0,1,1,{},{}A{},{},0,1,1,{},{}M{},{}A{},{},0,1,0,{},{}A{},{},0,1,0,{},{}Z",
            fmt_path(ox),
            fmt_path(oy),
            fmt_path(r1),
            fmt_path(r1),
            fmt_path(-ox),
            fmt_path(-oy),
            fmt_path(r1),
            fmt_path(r1),
            fmt_path(ox),
            fmt_path(oy),
            fmt_path(ix),
            fmt_path(iy),
            fmt_path(r0),
            fmt_path(r0),
            fmt_path(-ix),
            fmt_path(-iy),
            fmt_path(r0),
            fmt_path(r0),
            fmt_path(ix),
            fmt_path(iy),
        );
    }

    let end = arc.end_angle;
    let large = if span > PI { 1 } else { 0 };
    let (x0, y0) = (polar_x(start, r1), polar_y(start, r1));
    let (x1, y1) = (polar_x(end, r1), polar_y(end, r1));
    let (x2, y2) = (polar_x(end, r0), polar_y(end, r0));
    let (x3, y3) = (polar_x(start, r0), polar_y(start, r0));
    format!(
        "M{},{}A{},{},0,{},1,{},{}L{},{}A{},{},0,{},0,{},{}Z",
        fmt_path(x0),
        fmt_path(y0),
        fmt_path(r1),
        fmt_path(r1),
        large,
        fmt_path(x1),
        fmt_path(y1),
        fmt_path(x2),
        fmt_path(y2),
        fmt_path(r0),
        fmt_path(r0),
        large,
        fmt_path(x3),
        fmt_path(y3),
    )
}

/// Path data for a bundle curve through `points`.
///
/// Each interior point is pulled toward the straight source-destination
/// chord by `1 - beta`, then the blended points run through a uniform cubic
/// B-spline.
pub(crate) fn bundle_path_d(points: &[LayoutPoint], beta: f64) -> String {
    let n = points.len();
    if n == 0 {
        return String::new();
    }
    if n == 1 {
        return format!("M{},{}", fmt_path(points[0].x), fmt_path(points[0].y));
    }
    let last = (n - 1) as f64;
    let x0 = points[0].x;
    let y0 = points[0].y;
    let dx = points[n - 1].x - x0;
    let dy = points[n - 1].y - y0;
    let blended: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let t = i as f64 / last;
            (
                beta * p.x + (1.0 - beta) * (x0 + t * dx),
                beta * p.y + (1.0 - beta) * (y0 + t * dy),
            )
        })
        .collect();
    basis_path_d(&blended)
}

fn basis_bezier(out: &mut String, x0: f64, y0: f64, x1: f64, y1: f64, x: f64, y: f64) {
    let _ = write!(
        out,
        "C{},{},{},{},{},{}",
        fmt_path((2.0 * x0 + x1) / 3.0),
        fmt_path((2.0 * y0 + y1) / 3.0),
        fmt_path((x0 + 2.0 * x1) / 3.0),
        fmt_path((y0 + 2.0 * y1) / 3.0),
        fmt_path((x0 + 4.0 * x1 + x) / 6.0),
        fmt_path((y0 + 4.0 * y1 + y) / 6.0),
    );
}

fn basis_path_d(points: &[(f64, f64)]) -> String {
    let mut out = String::new();
    let (mut x0, mut y0, mut x1, mut y1) = (f64::NAN, f64::NAN, f64::NAN, f64::NAN);
    let mut state = 0u8;

    for &(x, y) in points {
        match state {
            0 => {
                state = 1;
                let _ = write!(out, "M{},{}", fmt_path(x), fmt_path(y));
            }
            1 => {
                state = 2;
            }
            2 => {
                state = 3;
                let _ = write!(
                    out,
                    "L{},{}",
                    fmt_path((5.0 * x0 + x1) / 6.0),
                    fmt_path((5.0 * y0 + y1) / 6.0),
                );
                basis_bezier(&mut out, x0, y0, x1, y1, x, y);
            }
            _ => basis_bezier(&mut out, x0, y0, x1, y1, x, y),
        }
        x0 = x1;
        x1 = x;
        y0 = y1;
        y1 = y;
    }
    match state {
        3 => {
            basis_bezier(&mut out, x0, y0, x1, y1, x1, y1);
            let _ = write!(out, "L{},{}", fmt_path(x1), fmt_path(y1));
        }
        2 => {
            let _ = write!(out, "L{},{}", fmt_path(x1), fmt_path(y1));
        }
        _ => {}
    }
    out
}

fn font_family(meta: &LayoutMeta) -> String {
    meta.effective_config
        .get("fontFamily")
        .and_then(|v| v.as_str())
        .unwrap_or(DEFAULT_FONT_FAMILY)
        .to_string()
}

fn font_size(meta: &LayoutMeta) -> f64 {
    meta.effective_config
        .get("fontSize")
        .and_then(|v| v.as_f64())
        .unwrap_or(DEFAULT_FONT_SIZE)
}

fn chord_css(diagram_id: &str, font_family: &str, font_size: f64) -> String {
    format!(
        "#{id}{{font-family:{font_family};font-size:{font_size}px;fill:#333;}}\
         #{id} .chord-outer-band-arc,#{id} .chord-inner-band-arc{{stroke:white;stroke-width:1px;}}\
         #{id} .chord-outer-band-label,#{id} .chord-inner-band-label{{fill:white;}}\
         #{id} .chord-node-graphic{{fill:#333;}}\
         #{id} .chord-node-label{{dominant-baseline:middle;}}\
         #{id} .chord-connection{{fill:none;stroke:#888;stroke-opacity:0.5;stroke-width:1.5px;}}\
         #{id} .chart-title{{text-anchor:middle;font-size:{title_size}px;}}",
        id = diagram_id,
        font_family = font_family,
        font_size = fmt(font_size),
        title_size = fmt(font_size * 1.5),
    )
}

fn bar_chart_css(diagram_id: &str, font_family: &str, font_size: f64) -> String {
    format!(
        "#{id}{{font-family:{font_family};font-size:{font_size}px;fill:#333;}}\
         #{id} .bar-chart-rect-graphic{{stroke:none;}}\
         #{id} .bar-chart-rect-label{{fill:#333;}}\
         #{id} .chart-title{{text-anchor:middle;font-size:{title_size}px;}}",
        id = diagram_id,
        font_family = font_family,
        font_size = fmt(font_size),
        title_size = fmt(font_size * 1.5),
    )
}

fn write_element(out: &mut String, element: &SceneElement) {
    let _ = write!(out, "<{}", element.name);
    for (key, value) in &element.attrs {
        let _ = write!(out, r#" {}="{}""#, key, escape_xml(value));
    }
    if element.name == "text" {
        if let Some(href) = &element.href {
            let body = element.text.as_deref().unwrap_or("");
            let _ = write!(
                out,
                r#"><textPath xlink:href="{}">{}</textPath></text>"#,
                escape_xml(href),
                escape_xml(body),
            );
            return;
        }
    } else if let Some(href) = &element.href {
        let _ = write!(out, r#" xlink:href="{}""#, escape_xml(href));
    }
    match &element.text {
        Some(text) => {
            let _ = write!(out, ">{}</{}>", escape_xml(text), element.name);
        }
        None => out.push_str("/>"),
    }
}

fn write_group(out: &mut String, group: &SceneGroup) {
    let _ = write!(out, r#"<g class="{}""#, escape_xml(&group.class));
    if let Some(transform) = &group.transform {
        let _ = write!(out, r#" transform="{}""#, escape_xml(transform));
    }
    out.push('>');
    for (_, element) in group.children() {
        write_element(out, element);
    }
    out.push_str("</g>");
}

fn write_svg_open(
    out: &mut String,
    diagram_id: &str,
    kind: &str,
    bounds: &Bounds,
    options: &SvgRenderOptions,
) {
    let pad = options.viewbox_padding;
    let view_w = bounds.max_x - bounds.min_x + 2.0 * pad;
    let view_h = bounds.max_y - bounds.min_y + 2.0 * pad;
    let background = options.background.as_deref().unwrap_or("white");
    let _ = write!(
        out,
        r#"<svg id="{id}" width="100%" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="{vx} {vy} {vw} {vh}" style="max-width: {vw}px; background-color: {background};" role="graphics-document document" aria-roledescription="{kind}">"#,
        id = escape_xml(diagram_id),
        vx = fmt(bounds.min_x - pad),
        vy = fmt(bounds.min_y - pad),
        vw = fmt(view_w),
        vh = fmt(view_h),
        background = escape_xml(background),
        kind = escape_xml(kind),
    );
}

fn write_title(out: &mut String, title: Option<&str>, width: f64, font_size: f64) {
    if let Some(title) = title {
        let _ = write!(
            out,
            r#"<text class="chart-title" x="{}" y="{}">{}</text>"#,
            fmt(width / 2.0),
            fmt(font_size * 2.0),
            escape_xml(title),
        );
    }
}

fn write_node_defs(out: &mut String, symbol_ids: &[String]) {
    if symbol_ids.is_empty() {
        return;
    }
    out.push_str("<defs>");
    for id in symbol_ids {
        // Headless renders have no asset catalog, so every symbol id gets a
        // plain circle glyph under the referenced id.
        let _ = write!(
            out,
            r#"<symbol id="{}" viewBox="0 0 24 24"><circle cx="12" cy="12" r="10"/></symbol>"#,
            escape_xml(id),
        );
    }
    out.push_str("</defs>");
}

/// Serializes a laid-out chart to a standalone SVG document.
pub fn render_svg(chart: &LayoutedChart, options: &SvgRenderOptions) -> String {
    match &chart.layout {
        LayoutChart::Chord(layout) => render_chord_svg(&chart.meta, layout, options),
        LayoutChart::Bar(layout) => render_bar_chart_svg(&chart.meta, layout, options),
    }
}

pub fn render_chord_svg(
    meta: &LayoutMeta,
    layout: &ChordDiagramLayout,
    options: &SvgRenderOptions,
) -> String {
    let diagram_id = options
        .diagram_id
        .clone()
        .unwrap_or_else(|| "chordate-svg".to_string());
    let bounds = layout.bounds.clone().unwrap_or(Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: layout.width,
        max_y: layout.height,
    });
    let family = font_family(meta);
    let size = font_size(meta);

    let mut scene = Scene::new();
    let stats = ChordComponent::new().populate(&mut scene, layout);
    tracing::debug!(groups = stats.len(), "serializing chord scene");

    let mut symbol_ids: Vec<String> = Vec::new();
    for node in &layout.nodes {
        let id = node_symbol_id(&node.asset_ref);
        if !symbol_ids.contains(&id) {
            symbol_ids.push(id);
        }
    }

    let mut out = String::new();
    write_svg_open(&mut out, &diagram_id, &meta.kind, &bounds, options);
    let _ = write!(
        out,
        "<style>{}</style>",
        chord_css(&diagram_id, &family, size)
    );
    write_node_defs(&mut out, &symbol_ids);
    write_title(&mut out, layout.title.as_deref(), layout.width, size);
    for group in scene.groups() {
        write_group(&mut out, group);
    }
    out.push_str("</svg>");
    out
}

pub fn render_bar_chart_svg(
    meta: &LayoutMeta,
    layout: &BarChartLayout,
    options: &SvgRenderOptions,
) -> String {
    let diagram_id = options
        .diagram_id
        .clone()
        .unwrap_or_else(|| "chordate-svg".to_string());
    let bounds = layout.bounds.clone().unwrap_or(Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: layout.width,
        max_y: layout.height,
    });
    let family = font_family(meta);
    let size = font_size(meta);

    let mut scene = Scene::new();
    let stats = BarChartComponent::new().populate(&mut scene, layout);
    tracing::debug!(groups = stats.len(), "serializing bar chart scene");

    let mut out = String::new();
    write_svg_open(&mut out, &diagram_id, &meta.kind, &bounds, options);
    let _ = write!(
        out,
        "<style>{}</style>",
        bar_chart_css(&diagram_id, &family, size)
    );
    write_title(&mut out, layout.title.as_deref(), layout.width, size);
    for group in scene.groups() {
        write_group(&mut out, group);
    }
    out.push_str("</svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_drops_float_noise() {
        assert_eq!(fmt(0.0), "0");
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(1.0000000001), "1");
        assert_eq!(fmt(2.5), "2.5");
        assert_eq!(fmt(f64::NAN), "0");
    }

    #[test]
    fn fmt_path_keeps_three_decimals() {
        assert_eq!(fmt_path(1.23456), "1.235");
        assert_eq!(fmt_path(100.0), "100");
        assert_eq!(fmt_path(0.0001), "0");
        assert_eq!(fmt_path(-0.0001), "0");
    }

    #[test]
    fn escape_xml_covers_markup_characters() {
        assert_eq!(
            escape_xml(r#"<a & "b">'c'"#),
            "&lt;a &amp; &quot;b&quot;&gt;&#39;c&#39;"
        );
    }

    #[test]
    fn annular_arc_quarter_turn() {
        let arc = ArcSpan {
            inner_radius: 100.0,
            outer_radius: 130.0,
            start_angle: 0.0,
            end_angle: std::f64::consts::FRAC_PI_2,
        };
        // Starts at 12 o'clock on the outer radius, sweeps clockwise to
        // 3 o'clock, and closes along the inner radius.
        assert_eq!(
            annular_arc_path(&arc),
            "M0,-130A130,130,0,0,1,130,0L100,0A100,100,0,0,0,0,-100Z"
        );
    }

    #[test]
    fn annular_arc_uses_large_flag_past_half_turn() {
        let arc = ArcSpan {
            inner_radius: 100.0,
            outer_radius: 130.0,
            start_angle: 0.0,
            end_angle: PI * 1.5,
        };
        let d = annular_arc_path(&arc);
        assert!(d.contains(",0,1,1,"), "outer sweep should be large: {d}");
    }

    #[test]
    fn full_ring_closes_without_collapsing() {
        let arc = ArcSpan {
            inner_radius: 100.0,
            outer_radius: 130.0,
            start_angle: 0.0,
            end_angle: TAU,
        };
        let d = annular_arc_path(&arc);
        assert!(d.starts_with("M0,-130"), "{d}");
        assert_eq!(d.matches('A').count(), 4, "{d}");
    }

    #[test]
    fn bundle_path_of_two_points_is_a_line() {
        let points = [
            LayoutPoint { x: 0.0, y: 0.0 },
            LayoutPoint { x: 10.0, y: 0.0 },
        ];
        assert_eq!(bundle_path_d(&points, 0.5), "M0,0L10,0");
    }

    #[test]
    fn bundle_path_of_three_points_is_a_spline() {
        let points = [
            LayoutPoint { x: 0.0, y: 0.0 },
            LayoutPoint { x: 0.0, y: 100.0 },
            LayoutPoint { x: 100.0, y: 100.0 },
        ];
        let d = bundle_path_d(&points, 0.5);
        assert!(d.starts_with("M0,0"), "{d}");
        assert!(d.contains('C'), "{d}");
        assert!(d.ends_with("L100,100"), "{d}");
    }

    #[test]
    fn beta_zero_collapses_onto_the_chord() {
        // With beta 0 every control point sits on the straight line, so the
        // spline cannot leave it.
        let points = [
            LayoutPoint { x: 0.0, y: 0.0 },
            LayoutPoint { x: -50.0, y: 80.0 },
            LayoutPoint { x: 100.0, y: 0.0 },
        ];
        let d = bundle_path_d(&points, 0.0);
        assert!(!d.contains("80"), "{d}");
    }

    #[test]
    fn data_points_attr_is_base64_json() {
        let points = [LayoutPoint { x: 1.0, y: -2.0 }];
        let decoded = BASE64.decode(data_points_attr(&points)).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), r#"[{"x":1,"y":-2}]"#);
    }
}
