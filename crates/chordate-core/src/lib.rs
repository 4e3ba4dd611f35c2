#![forbid(unsafe_code)]

//! Chart document model + engine (headless).
//!
//! Design goals:
//! - deterministic, testable outputs (no DOM, no wall clock, no ambient randomness)
//! - runtime-agnostic async APIs (no specific executor required)

pub mod aggregate;
pub mod config;
pub mod detect;
pub mod error;
pub mod geom;
pub mod model;
pub mod scale;

pub use config::{ChartConfig, default_site_config};
pub use detect::{Detector, DetectorRegistry};
pub use error::{Error, Result};
pub use model::{
    BarChart, BarRecord, ChartModel, ChordChart, ConnectionRecord, NodeRecord, NodeSource,
};
pub use scale::{LinearScale, radius_from_dimensions};

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub suppress_errors: bool,
}

impl ParseOptions {
    /// Strict parsing (errors are returned).
    pub fn strict() -> Self {
        Self {
            suppress_errors: false,
        }
    }

    /// Lenient parsing: invalid records are dropped, and documents that cannot
    /// be detected at all yield `None` instead of an error.
    pub fn lenient() -> Self {
        Self {
            suppress_errors: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartMeta {
    pub kind: String,
    /// Config overrides embedded in the document's `config` key.
    pub config: ChartConfig,
    /// The effective config used for parsing after applying site defaults.
    pub effective_config: ChartConfig,
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedChart {
    pub meta: ChartMeta,
    pub model: ChartModel,
}

#[derive(Debug, Clone)]
pub struct Engine {
    registry: DetectorRegistry,
    site_config: ChartConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            registry: DetectorRegistry::default_charts(),
            site_config: default_site_config(),
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site_config(mut self, site_config: ChartConfig) -> Self {
        // Merge overrides onto schema defaults so downstream lookups keep working.
        self.site_config.deep_merge(site_config.as_value());
        self
    }

    pub fn registry(&self) -> &DetectorRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DetectorRegistry {
        &mut self.registry
    }

    /// Synchronous variant of [`Engine::parse_meta`].
    ///
    /// This is useful for render pipelines that are synchronous (e.g. immediate-mode UI),
    /// where introducing an async executor would be awkward. The parsing work is CPU-bound
    /// and does not perform I/O.
    pub fn parse_meta_sync(&self, text: &str, options: ParseOptions) -> Result<Option<ChartMeta>> {
        let Some((_, meta)) = self.decode_and_detect(text, options)? else {
            return Ok(None);
        };
        Ok(Some(meta))
    }

    pub async fn parse_meta(&self, text: &str, options: ParseOptions) -> Result<Option<ChartMeta>> {
        self.parse_meta_sync(text, options)
    }

    /// Synchronous variant of [`Engine::parse_chart`].
    pub fn parse_chart_sync(
        &self,
        text: &str,
        options: ParseOptions,
    ) -> Result<Option<ParsedChart>> {
        let Some((doc, meta)) = self.decode_and_detect(text, options)? else {
            return Ok(None);
        };

        tracing::debug!(kind = %meta.kind, "parsing chart document");
        let model = match meta.kind.as_str() {
            "chord" => ChartModel::Chord(model::parse_chord_model(&doc, options)?),
            "barChart" => ChartModel::Bar(model::parse_bar_model(&doc, options)?),
            other => {
                return Err(Error::UnsupportedChart {
                    kind: other.to_string(),
                });
            }
        };

        Ok(Some(ParsedChart { meta, model }))
    }

    pub async fn parse_chart(
        &self,
        text: &str,
        options: ParseOptions,
    ) -> Result<Option<ParsedChart>> {
        self.parse_chart_sync(text, options)
    }

    fn decode_and_detect(
        &self,
        text: &str,
        options: ParseOptions,
    ) -> Result<Option<(serde_json::Value, ChartMeta)>> {
        let doc: serde_json::Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(err) => {
                if options.suppress_errors {
                    return Ok(None);
                }
                return Err(err.into());
            }
        };
        if !doc.is_object() {
            return Ok(None);
        }

        let config = match doc.get("config") {
            Some(value) => ChartConfig::from_value(value.clone()),
            None => ChartConfig::empty_object(),
        };
        let mut effective_config = self.site_config.clone();
        effective_config.deep_merge(config.as_value());

        let kind = match self.registry.detect_kind(&doc, &mut effective_config) {
            Ok(k) => k.to_string(),
            Err(err) => {
                if options.suppress_errors {
                    return Ok(None);
                }
                return Err(err);
            }
        };

        let title = doc
            .get("title")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .filter(|t| !t.is_empty());

        Ok(Some((
            doc,
            ChartMeta {
                kind,
                config,
                effective_config,
                title,
            },
        )))
    }
}

#[cfg(test)]
mod tests;
