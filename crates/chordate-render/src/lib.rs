//! Headless layout and SVG rendering for chordate charts.
//!
//! [`layout_parsed`] turns a parsed chart into geometry: angles, radii,
//! node positions, fitted labels and connection curves for chord diagrams,
//! rects and labels for bar charts. [`render_svg`] serializes a layout to a
//! standalone SVG document through the scene graph in [`scene`]. Both run
//! without a browser or font server; text is sized by a pluggable
//! [`text::TextMeasurer`].

#![forbid(unsafe_code)]

pub mod barchart;
pub mod chord;
pub mod model;
pub mod scene;
pub mod svg;
pub mod text;
pub mod theme;

use chordate_core::{ChartModel, ConnectionRecord, ParsedChart};
use std::sync::Arc;

pub use model::{
    ArcSpan, BarChartLayout, BarLayout, Bounds, ChordDiagramLayout, ChordNodeLayout,
    ConnectionLayout, InnerSegmentLayout, LayoutChart, LayoutMeta, LayoutPoint, LayoutedChart,
    OuterSegmentLayout,
};
pub use scene::{
    BarChartComponent, BarChartDomModel, ChordComponent, ChordDomModel, ReconcileStats, Scene,
    SceneElement, SceneGroup,
};
pub use svg::{SvgRenderOptions, render_bar_chart_svg, render_chord_svg, render_svg};
pub use text::{DeterministicTextMeasurer, FittedText, TextMeasurer, TextMetrics, TextStyle};
pub use theme::ColorScale;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid chart model: {message}")]
    InvalidModel { message: String },
}

/// Where a chord diagram's connections come from when the document itself
/// carries none.
#[derive(Debug, Clone, Default)]
pub enum ConnectionSource {
    /// Render only document-embedded connections.
    #[default]
    Omit,
    /// Synthesize a reproducible random set from this seed.
    Synthesize { seed: u64 },
    /// Use these records as-is.
    Supplied(Vec<ConnectionRecord>),
}

#[derive(Clone)]
pub struct LayoutOptions {
    /// Measures label text. The default estimates from character counts, so
    /// layouts stay identical across machines.
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    pub connections: ConnectionSource,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            connections: ConnectionSource::default(),
        }
    }
}

impl std::fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutOptions")
            .field("connections", &self.connections)
            .finish_non_exhaustive()
    }
}

/// Computes the layout for a parsed chart.
pub fn layout_parsed(parsed: &ParsedChart, options: &LayoutOptions) -> Result<LayoutedChart> {
    let meta = LayoutMeta::from_chart_meta(&parsed.meta);
    let measurer = options.text_measurer.as_ref();
    let layout = match &parsed.model {
        ChartModel::Chord(chart) => LayoutChart::Chord(chord::layout_chord_diagram(
            chart,
            &meta.effective_config,
            measurer,
            &options.connections,
        )?),
        ChartModel::Bar(chart) => LayoutChart::Bar(barchart::layout_bar_chart(
            chart,
            &meta.effective_config,
            measurer,
        )?),
    };
    Ok(LayoutedChart { meta, layout })
}
