#![forbid(unsafe_code)]

//! `chordate` is a headless chart engine for chord diagrams and bar charts.
//!
//! Documents are JSON; parsing, layout and rendering are deterministic and
//! run without a browser, font server or GPU.
//!
//! # Features
//!
//! - `render`: enable layout + SVG rendering (`chordate::render`)
//! - `raster`: enable PNG/JPG/PDF output via pure-Rust SVG rasterization/conversion

pub use chordate_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use chordate_render::model::{LayoutChart, LayoutedChart};
    pub use chordate_render::svg::SvgRenderOptions;
    pub use chordate_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use chordate_render::{ConnectionSource, LayoutOptions, layout_parsed};

    #[cfg(feature = "raster")]
    pub mod raster;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Parse(#[from] chordate_core::Error),
        #[error(transparent)]
        Render(#[from] chordate_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Converts an arbitrary string into a conservative SVG `id` token suitable
    /// for embedding multiple charts in the same UI tree.
    ///
    /// The root `<svg id="...">` value scopes the chart's stylesheet and is
    /// referenced by internal ids like band arc paths. Inlining several SVGs
    /// with the same id makes those references ambiguous.
    ///
    /// This helper:
    /// - trims whitespace
    /// - replaces unsupported characters with `-`
    /// - ensures the id starts with an ASCII letter by prefixing `c-` when needed
    pub fn sanitize_svg_id(raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return "c-untitled".to_string();
        }

        let mut out = String::with_capacity(raw.len() + 4);
        for ch in raw.chars() {
            let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':' || ch == '.';
            out.push(if ok { ch } else { '-' });
        }

        let starts_ok = out.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_ok {
            out.insert_str(0, "c-");
        }

        while out.contains("--") {
            out = out.replace("--", "-");
        }
        let out = out.trim_matches('-');
        if out.is_empty() || out == "c" {
            return "c-untitled".to_string();
        }
        out.to_string()
    }

    /// Synchronous layout helper (executor-free).
    pub fn layout_chart_sync(
        engine: &chordate_core::Engine,
        text: &str,
        parse_options: chordate_core::ParseOptions,
        layout_options: &LayoutOptions,
    ) -> Result<Option<LayoutedChart>> {
        let Some(parsed) = engine.parse_chart_sync(text, parse_options)? else {
            return Ok(None);
        };
        Ok(Some(chordate_render::layout_parsed(
            &parsed,
            layout_options,
        )?))
    }

    pub async fn layout_chart(
        engine: &chordate_core::Engine,
        text: &str,
        parse_options: chordate_core::ParseOptions,
        layout_options: &LayoutOptions,
    ) -> Result<Option<LayoutedChart>> {
        layout_chart_sync(engine, text, parse_options, layout_options)
    }

    pub fn render_layouted_svg(chart: &LayoutedChart, svg_options: &SvgRenderOptions) -> String {
        chordate_render::render_svg(chart, svg_options)
    }

    /// Synchronous SVG render helper (executor-free).
    pub fn render_svg_sync(
        engine: &chordate_core::Engine,
        text: &str,
        parse_options: chordate_core::ParseOptions,
        layout_options: &LayoutOptions,
        svg_options: &SvgRenderOptions,
    ) -> Result<Option<String>> {
        let Some(chart) = layout_chart_sync(engine, text, parse_options, layout_options)? else {
            return Ok(None);
        };
        Ok(Some(render_layouted_svg(&chart, svg_options)))
    }

    pub async fn render_svg(
        engine: &chordate_core::Engine,
        text: &str,
        parse_options: chordate_core::ParseOptions,
        layout_options: &LayoutOptions,
        svg_options: &SvgRenderOptions,
    ) -> Result<Option<String>> {
        render_svg_sync(engine, text, parse_options, layout_options, svg_options)
    }

    /// Convenience wrapper that bundles an [`Engine`](chordate_core::Engine)
    /// and common options for headless rendering.
    ///
    /// Intended for UI integrations where passing 4-5 separate parameters per
    /// call is noisy. It stays runtime-agnostic: all work is CPU-bound and
    /// does not perform I/O.
    #[derive(Clone)]
    pub struct HeadlessRenderer {
        pub engine: chordate_core::Engine,
        pub parse: chordate_core::ParseOptions,
        pub layout: LayoutOptions,
        pub svg: SvgRenderOptions,
    }

    impl Default for HeadlessRenderer {
        fn default() -> Self {
            Self {
                engine: chordate_core::Engine::new(),
                parse: chordate_core::ParseOptions::default(),
                layout: LayoutOptions::default(),
                svg: SvgRenderOptions::default(),
            }
        }
    }

    impl HeadlessRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_site_config(mut self, site_config: chordate_core::ChartConfig) -> Self {
            self.engine = self.engine.with_site_config(site_config);
            self
        }

        /// Chord documents without embedded connections get a synthesized set
        /// from this seed.
        pub fn with_connection_seed(mut self, seed: u64) -> Self {
            self.layout.connections = ConnectionSource::Synthesize { seed };
            self
        }

        pub fn parse_meta_sync(&self, text: &str) -> Result<Option<chordate_core::ChartMeta>> {
            Ok(self.engine.parse_meta_sync(text, self.parse)?)
        }

        pub fn parse_chart_sync(&self, text: &str) -> Result<Option<chordate_core::ParsedChart>> {
            Ok(self.engine.parse_chart_sync(text, self.parse)?)
        }

        pub fn layout_chart_sync(&self, text: &str) -> Result<Option<LayoutedChart>> {
            layout_chart_sync(&self.engine, text, self.parse, &self.layout)
        }

        pub fn render_svg_sync(&self, text: &str) -> Result<Option<String>> {
            render_svg_sync(&self.engine, text, self.parse, &self.layout, &self.svg)
        }

        pub fn render_svg_sync_with(
            &self,
            text: &str,
            svg: &SvgRenderOptions,
        ) -> Result<Option<String>> {
            render_svg_sync(&self.engine, text, self.parse, &self.layout, svg)
        }

        pub fn render_svg_sync_with_diagram_id(
            &self,
            text: &str,
            diagram_id: &str,
        ) -> Result<Option<String>> {
            let mut svg = self.svg.clone();
            svg.diagram_id = Some(sanitize_svg_id(diagram_id));
            self.render_svg_sync_with(text, &svg)
        }

        #[cfg(feature = "raster")]
        pub fn render_png_sync(
            &self,
            text: &str,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Option<Vec<u8>>> {
            raster::render_png_sync(
                &self.engine,
                text,
                self.parse,
                &self.layout,
                &self.svg,
                raster,
            )
        }

        #[cfg(feature = "raster")]
        pub fn render_jpeg_sync(
            &self,
            text: &str,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Option<Vec<u8>>> {
            raster::render_jpeg_sync(
                &self.engine,
                text,
                self.parse,
                &self.layout,
                &self.svg,
                raster,
            )
        }

        #[cfg(feature = "raster")]
        pub fn render_pdf_sync(&self, text: &str) -> raster::Result<Option<Vec<u8>>> {
            raster::render_pdf_sync(&self.engine, text, self.parse, &self.layout, &self.svg)
        }
    }
}
