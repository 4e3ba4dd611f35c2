use chordate_core::ChartMeta;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutMeta {
    pub kind: String,
    pub title: Option<String>,
    pub config: Value,
    pub effective_config: Value,
}

impl LayoutMeta {
    pub fn from_chart_meta(meta: &ChartMeta) -> Self {
        Self {
            kind: meta.kind.clone(),
            title: meta.title.clone(),
            config: meta.config.as_value().clone(),
            effective_config: meta.effective_config.as_value().clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

/// Annular sector between two radii. Angles are radians, "12 o'clock is
/// zero", growing clockwise.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArcSpan {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl ArcSpan {
    pub fn mid_radius(&self) -> f64 {
        (self.inner_radius + self.outer_radius) / 2.0
    }

    pub fn thickness(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

/// An inner band segment: the secondary-tag partition of one outer segment's
/// members, laid out inside the parent's angular range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InnerSegmentLayout {
    /// Tag concatenated with the parent id so ids stay unique across parents.
    pub id: String,
    pub tag: String,
    pub parent_id: String,
    pub label: String,
    pub display_label: String,
    pub color: String,
    pub arc: ArcSpan,
    pub node_ids: Vec<String>,
    /// textPath start offsets for the band label (along-arc, off-arc).
    pub label_dx: f64,
    pub label_dy: f64,
}

/// An outer band segment: one primary tag and the nodes carrying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OuterSegmentLayout {
    pub id: String,
    pub tag: String,
    pub label: String,
    pub display_label: String,
    pub color: String,
    pub arc: ArcSpan,
    pub node_ids: Vec<String>,
    pub children: Vec<InnerSegmentLayout>,
    pub label_dx: f64,
    pub label_dy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChordNodeLayout {
    pub id: String,
    pub label: String,
    pub display_label: String,
    /// Angle in degrees, 0-360, clockwise from 12 o'clock.
    pub angle: f64,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub asset_ref: String,
    /// `start` on the right half of the ring, `end` on the left half.
    pub text_anchor: String,
    /// Rotation (degrees) applied to the node label so it reads outwards.
    pub label_rotate: f64,
    /// Radial distance the rotated label is pushed out to.
    pub label_translate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionLayout {
    pub id: String,
    pub source: String,
    pub destination: String,
    pub points: Vec<LayoutPoint>,
    /// Bundle-curve path through `points`, ready for an SVG `d` attribute.
    pub path_d: String,
    #[serde(default)]
    pub attrs: IndexMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChordDiagramLayout {
    pub bounds: Option<Bounds>,
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub label_offset: f64,
    pub node_size: f64,
    pub title: Option<String>,
    pub segments: Vec<OuterSegmentLayout>,
    pub nodes: Vec<ChordNodeLayout>,
    pub connections: Vec<ConnectionLayout>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarLayout {
    pub id: String,
    pub label: String,
    pub display_label: String,
    pub color: String,
    pub count: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label_x: f64,
    pub label_y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarChartLayout {
    pub bounds: Option<Bounds>,
    pub width: f64,
    pub height: f64,
    pub title: Option<String>,
    pub bars: Vec<BarLayout>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LayoutChart {
    Chord(ChordDiagramLayout),
    Bar(BarChartLayout),
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutedChart {
    pub meta: LayoutMeta,
    pub layout: LayoutChart,
}
