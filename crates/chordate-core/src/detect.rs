use crate::{ChartConfig, Result};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
#[error("No chart kind detected matching given configuration for document with keys: {keys}")]
pub struct DetectKindError {
    pub keys: String,
}

pub type DetectorFn = fn(doc: &Value, config: &mut ChartConfig) -> bool;

#[derive(Debug, Clone)]
pub struct Detector {
    pub id: &'static str,
    pub detector: DetectorFn,
}

#[derive(Debug, Clone)]
pub struct DetectorRegistry {
    detectors: Vec<Detector>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    pub fn add(&mut self, detector: Detector) {
        self.detectors.push(detector);
    }

    pub fn add_fn(&mut self, id: &'static str, detector: DetectorFn) {
        self.add(Detector { id, detector });
    }

    pub fn detect_kind(&self, doc: &Value, config: &mut ChartConfig) -> Result<&'static str> {
        for det in &self.detectors {
            if (det.detector)(doc, config) {
                return Ok(det.id);
            }
        }

        let keys = match doc.as_object() {
            Some(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
            None => String::new(),
        };
        Err(DetectKindError { keys }.into())
    }

    pub fn default_charts() -> Self {
        let mut reg = Self::new();

        // An explicit `kind` wins over key inference, so it is checked first.
        reg.add_fn("chord", detector_chord);
        reg.add_fn("barChart", detector_bar_chart);

        reg
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn detector_chord(doc: &Value, _config: &mut ChartConfig) -> bool {
    match doc.get("kind").and_then(Value::as_str) {
        Some(kind) => kind == "chord",
        None => doc.get("nodes").is_some_and(Value::is_array),
    }
}

fn detector_bar_chart(doc: &Value, _config: &mut ChartConfig) -> bool {
    match doc.get("kind").and_then(Value::as_str) {
        Some(kind) => kind == "barChart",
        None => doc.get("bars").is_some_and(Value::is_array),
    }
}
