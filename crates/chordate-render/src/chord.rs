use crate::model::{
    ArcSpan, Bounds, ChordDiagramLayout, ChordNodeLayout, ConnectionLayout, InnerSegmentLayout,
    LayoutPoint, OuterSegmentLayout,
};
use crate::text::{TextMeasurer, TextStyle, fit_text_to_arc, fit_text_to_container};
use crate::theme::ColorScale;
use crate::{ConnectionSource, Error, Result};
use chordate_core::aggregate::sum_by;
use chordate_core::{ChordChart, ConnectionRecord, LinearScale, NodeRecord, geom, radius_from_dimensions};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::f64::consts::TAU;

#[derive(Debug, Clone)]
struct ChordChartConfig {
    width: f64,
    height: f64,
    label_offset: f64,
    band_thickness: f64,
    node_size: f64,
    arc_label_margin: f64,
    container_label_margin: f64,
    loop_radius: f64,
    font_family: Option<String>,
    font_size: f64,
}

fn json_f64(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_i64().map(|n| n as f64))
        .or_else(|| v.as_u64().map(|n| n as f64))
}

fn config_f64(cfg: &Value, path: &[&str]) -> Option<f64> {
    let mut cur = cfg;
    for key in path {
        cur = cur.get(*key)?;
    }
    json_f64(cur)
}

fn config_string(cfg: &Value, path: &[&str]) -> Option<String> {
    let mut cur = cfg;
    for key in path {
        cur = cur.get(*key)?;
    }
    cur.as_str().map(|s| s.to_string())
}

fn default_chord_config() -> ChordChartConfig {
    ChordChartConfig {
        width: 800.0,
        height: 600.0,
        label_offset: 120.0,
        band_thickness: 30.0,
        node_size: 12.0,
        arc_label_margin: 40.0,
        container_label_margin: 50.0,
        loop_radius: 100.0,
        font_family: None,
        font_size: 16.0,
    }
}

fn parse_chord_config(effective_config: &Value) -> ChordChartConfig {
    let base = default_chord_config();
    ChordChartConfig {
        width: config_f64(effective_config, &["chord", "width"]).unwrap_or(base.width),
        height: config_f64(effective_config, &["chord", "height"]).unwrap_or(base.height),
        label_offset: config_f64(effective_config, &["chord", "labelOffset"])
            .unwrap_or(base.label_offset),
        band_thickness: config_f64(effective_config, &["chord", "bandThickness"])
            .unwrap_or(base.band_thickness),
        node_size: config_f64(effective_config, &["chord", "nodeSize"]).unwrap_or(base.node_size),
        arc_label_margin: config_f64(effective_config, &["chord", "arcLabelMargin"])
            .unwrap_or(base.arc_label_margin),
        container_label_margin: config_f64(effective_config, &["chord", "containerLabelMargin"])
            .unwrap_or(base.container_label_margin),
        loop_radius: config_f64(effective_config, &["chord", "loopRadius"])
            .unwrap_or(base.loop_radius),
        font_family: config_string(effective_config, &["fontFamily"]).or(base.font_family),
        font_size: config_f64(effective_config, &["fontSize"]).unwrap_or(base.font_size),
    }
}

/// One tag partition: member indices into the chart's node list, grouped in
/// first-seen tag order.
fn partition_by_tag<'a>(
    nodes: &[NodeRecord],
    members: impl Iterator<Item = usize>,
    tag_of: impl Fn(&NodeRecord) -> Option<&str> + 'a,
) -> IndexMap<String, Vec<usize>> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for idx in members {
        let Some(tag) = tag_of(&nodes[idx]) else {
            continue;
        };
        groups.entry(tag.to_string()).or_default().push(idx);
    }
    groups
}

fn segment_label(tag: &str, count: usize) -> String {
    format!("({count}) {tag}")
}

pub fn layout_chord_diagram(
    chart: &ChordChart,
    effective_config: &Value,
    measurer: &dyn TextMeasurer,
    connections: &ConnectionSource,
) -> Result<ChordDiagramLayout> {
    let cfg = parse_chord_config(effective_config);
    let radius = radius_from_dimensions(cfg.height, cfg.width, cfg.label_offset);
    if radius <= 0.0 {
        return Err(Error::InvalidModel {
            message: format!(
                "label offset {} leaves no chart radius in a {}x{} viewport",
                cfg.label_offset, cfg.width, cfg.height
            ),
        });
    }

    let label_style = TextStyle {
        font_family: cfg.font_family.clone(),
        font_size: cfg.font_size,
        font_weight: None,
    };

    tracing::debug!(nodes = chart.nodes.len(), "computing chord layout");

    // Outer partition: distinct primary tags in first-seen order. Nodes
    // without a primary tag share one unnamed segment so the partition stays
    // total.
    let groups = partition_by_tag(&chart.nodes, 0..chart.nodes.len(), |n| {
        Some(n.primary_tag().unwrap_or(""))
    });
    let group_list: Vec<(&String, &Vec<usize>)> = groups.iter().collect();
    let total = sum_by(&group_list, |(_, members)| Some(members.len() as f64));
    let angle_scale = LinearScale::new(0.0, total, 0.0, TAU);

    let mut color_scale = ColorScale::from_config_section(effective_config.get("chord"));

    let mut segments: Vec<OuterSegmentLayout> = Vec::with_capacity(groups.len());
    let mut nodes: Vec<ChordNodeLayout> = Vec::with_capacity(chart.nodes.len());

    let mut acc = 0.0;
    for (tag, members) in &groups {
        let start_angle = angle_scale.map(acc);
        acc += members.len() as f64;
        let end_angle = angle_scale.map(acc);

        let arc = ArcSpan {
            inner_radius: radius + cfg.band_thickness,
            outer_radius: radius + 2.0 * cfg.band_thickness,
            start_angle,
            end_angle,
        };
        let label = segment_label(tag, members.len());
        let fitted = fit_text_to_arc(&label, &arc, cfg.arc_label_margin, &label_style, measurer);
        let color = color_scale.color_for(tag);

        // Secondary partition of this segment's members, rescaled into the
        // parent's angular range. The child total is the sum of child member
        // counts so children exactly cover the parent range even when some
        // members carry no secondary tag.
        let child_groups =
            partition_by_tag(&chart.nodes, members.iter().copied(), |n| n.secondary_tag());
        let child_total: f64 = child_groups.values().map(|m| m.len() as f64).sum();
        let child_scale = LinearScale::new(0.0, child_total, start_angle, end_angle);

        let mut children: Vec<InnerSegmentLayout> = Vec::with_capacity(child_groups.len());
        let mut child_acc = 0.0;
        for (child_tag, child_members) in &child_groups {
            let child_start = child_scale.map(child_acc);
            child_acc += child_members.len() as f64;
            let child_end = child_scale.map(child_acc);

            let child_arc = ArcSpan {
                inner_radius: radius,
                outer_radius: radius + cfg.band_thickness,
                start_angle: child_start,
                end_angle: child_end,
            };
            let child_label = segment_label(child_tag, child_members.len());
            let child_fitted = fit_text_to_arc(
                &child_label,
                &child_arc,
                cfg.arc_label_margin,
                &label_style,
                measurer,
            );
            let child_color = color_scale.color_for(child_tag);

            children.push(InnerSegmentLayout {
                id: format!("{child_tag}{tag}"),
                tag: child_tag.clone(),
                parent_id: tag.clone(),
                label: child_label,
                display_label: child_fitted.text,
                color: child_color,
                arc: child_arc,
                node_ids: child_members
                    .iter()
                    .map(|&idx| chart.nodes[idx].id.clone())
                    .collect(),
                label_dx: geom::arc_length(child_start, child_end, child_arc.mid_radius()) / 2.0,
                label_dy: child_arc.thickness() / 2.0,
            });
        }

        // Every member gets one slot; the slot midpoint keeps nodes off the
        // segment boundaries.
        let slot_scale = LinearScale::new(0.0, members.len() as f64, start_angle, end_angle);
        for (slot, &idx) in members.iter().enumerate() {
            let record = &chart.nodes[idx];
            let theta = slot_scale.map(slot as f64 + 0.5);
            let angle = geom::to_degrees(theta);
            let flip = angle > 180.0;

            let fitted = fit_text_to_container(
                &record.label,
                cfg.width,
                cfg.height,
                theta,
                radius + cfg.label_offset,
                cfg.container_label_margin,
                &label_style,
                measurer,
            );

            nodes.push(ChordNodeLayout {
                id: record.id.clone(),
                label: record.label.clone(),
                display_label: fitted.text,
                angle,
                radius,
                x: geom::polar_x(theta, radius),
                y: geom::polar_y(theta, radius),
                size: cfg.node_size,
                asset_ref: record.asset_ref.clone(),
                text_anchor: if flip { "end" } else { "start" }.to_string(),
                label_rotate: angle + 90.0 * if flip { 1.0 } else { -1.0 },
                label_translate: (radius + cfg.label_offset / 2.0) * if flip { -1.0 } else { 1.0 },
            });
        }

        segments.push(OuterSegmentLayout {
            id: tag.clone(),
            tag: tag.clone(),
            label,
            display_label: fitted.text,
            color,
            arc,
            node_ids: members
                .iter()
                .map(|&idx| chart.nodes[idx].id.clone())
                .collect(),
            children,
            label_dx: geom::arc_length(start_angle, end_angle, arc.mid_radius()) / 2.0,
            label_dy: arc.thickness() / 2.0,
        });
    }

    let records = resolve_connection_records(chart, connections);
    let connections = layout_connections(&records, &nodes, cfg.loop_radius)?;

    Ok(ChordDiagramLayout {
        bounds: Some(Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: cfg.width,
            max_y: cfg.height,
        }),
        width: cfg.width,
        height: cfg.height,
        center_x: cfg.width / 2.0,
        center_y: cfg.height / 2.0,
        radius,
        label_offset: cfg.label_offset,
        node_size: cfg.node_size,
        title: chart.title.clone(),
        segments,
        nodes,
        connections,
    })
}

fn resolve_connection_records(
    chart: &ChordChart,
    source: &ConnectionSource,
) -> Vec<ConnectionRecord> {
    // Connections embedded in the document win over whatever the caller asked
    // for; the source only fills the gap.
    if let Some(records) = &chart.connections {
        return records.clone();
    }
    match source {
        ConnectionSource::Omit => Vec::new(),
        ConnectionSource::Supplied(records) => records.clone(),
        ConnectionSource::Synthesize { seed } => synthesize_connections(&chart.nodes, *seed),
    }
}

/// Draws a reproducible set of random connections between the chart's nodes.
/// Same seed, same nodes, same output.
pub fn synthesize_connections(nodes: &[NodeRecord], seed: u64) -> Vec<ConnectionRecord> {
    if nodes.is_empty() {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let count = rng.gen_range(1..=100);
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let id: String = (0..8).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();
        let source = nodes[rng.gen_range(0..nodes.len())].id.clone();
        let destination = nodes[rng.gen_range(0..nodes.len())].id.clone();
        out.push(ConnectionRecord {
            id,
            source,
            destination,
            attrs: IndexMap::new(),
        });
    }
    out
}

/// Control points for one connection curve.
///
/// A self loop swings around the ring through three auxiliary points placed a
/// quarter turn apart at half the loop radius; anything else routes through
/// the chart center.
pub fn connection_points(
    source: &ChordNodeLayout,
    destination: &ChordNodeLayout,
    loop_radius: f64,
) -> Vec<LayoutPoint> {
    let source_point = LayoutPoint {
        x: source.x,
        y: source.y,
    };
    let destination_point = LayoutPoint {
        x: destination.x,
        y: destination.y,
    };
    if source.id == destination.id {
        let theta = geom::to_radians(source.angle);
        let half = loop_radius / 2.0;
        let mut points = Vec::with_capacity(5);
        points.push(source_point);
        for quarter in 1..=3 {
            let angle = theta + quarter as f64 * std::f64::consts::FRAC_PI_2;
            points.push(LayoutPoint {
                x: geom::polar_x(angle, half),
                y: geom::polar_y(angle, half),
            });
        }
        points.push(destination_point);
        return points;
    }
    vec![
        source_point,
        LayoutPoint { x: 0.0, y: 0.0 },
        destination_point,
    ]
}

fn layout_connections(
    records: &[ConnectionRecord],
    nodes: &[ChordNodeLayout],
    loop_radius: f64,
) -> Result<Vec<ConnectionLayout>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let by_id: FxHashMap<&str, &ChordNodeLayout> =
        nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let source = by_id.get(record.source.as_str()).ok_or_else(|| Error::InvalidModel {
            message: format!(
                "connection `{}` references unknown node `{}`",
                record.id, record.source
            ),
        })?;
        let destination =
            by_id.get(record.destination.as_str()).ok_or_else(|| Error::InvalidModel {
                message: format!(
                    "connection `{}` references unknown node `{}`",
                    record.id, record.destination
                ),
            })?;

        let points = connection_points(source, destination, loop_radius);
        let path_d = crate::svg::bundle_path_d(&points, 0.5);
        out.push(ConnectionLayout {
            id: record.id.clone(),
            source: record.source.clone(),
            destination: record.destination.clone(),
            points,
            path_d,
            attrs: record.attrs.clone(),
        });
    }
    Ok(out)
}
