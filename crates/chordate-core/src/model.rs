use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, ParseOptions, Result};

/// One tagged record in a chord chart document.
///
/// `tags` is ordered: slot 0 is the primary grouping tag and slot 1 the
/// secondary one. Short or missing tag lists are valid input; the accessors
/// return `None` for absent slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "assetRef")]
    #[serde(default)]
    pub asset_ref: String,
}

impl NodeRecord {
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    pub fn secondary_tag(&self) -> Option<&str> {
        self.tags.get(1).map(String::as_str)
    }
}

/// One record in a bar chart document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarRecord {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub count: f64,
    #[serde(default)]
    pub color: Option<String>,
}

/// A caller-supplied edge between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: String,
    pub source: String,
    pub destination: String,
    /// Extra presentation attributes applied verbatim to the rendered path.
    #[serde(default)]
    pub attrs: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordChart {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub connections: Option<Vec<ConnectionRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub bars: Vec<BarRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartModel {
    Chord(ChordChart),
    Bar(BarChart),
}

impl ChartModel {
    pub fn kind(&self) -> &'static str {
        match self {
            ChartModel::Chord(_) => "chord",
            ChartModel::Bar(_) => "barChart",
        }
    }

    pub fn as_chord(&self) -> Option<&ChordChart> {
        match self {
            ChartModel::Chord(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn as_bar(&self) -> Option<&BarChart> {
        match self {
            ChartModel::Bar(chart) => Some(chart),
            _ => None,
        }
    }
}

/// Source of the node records a chord layout is computed from.
pub trait NodeSource {
    fn nodes(&self) -> &[NodeRecord];
}

impl NodeSource for ChordChart {
    fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }
}

impl NodeSource for Vec<NodeRecord> {
    fn nodes(&self) -> &[NodeRecord] {
        self
    }
}

fn parse_error(kind: &str, message: impl Into<String>) -> Error {
    Error::ChartParse {
        kind: kind.to_string(),
        message: message.into(),
    }
}

fn collect_records<T: serde::de::DeserializeOwned>(
    doc: &Value,
    key: &str,
    kind: &str,
    options: ParseOptions,
) -> Result<Vec<T>> {
    let Some(value) = doc.get(key) else {
        return Ok(Vec::new());
    };
    let Some(values) = value.as_array() else {
        if options.suppress_errors {
            tracing::debug!(kind, key, "dropping non-array record list");
            return Ok(Vec::new());
        }
        return Err(parse_error(kind, format!("`{key}` must be an array")));
    };

    let mut out = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<T>(value.clone()) {
            Ok(record) => out.push(record),
            Err(err) => {
                if !options.suppress_errors {
                    return Err(parse_error(kind, format!("invalid `{key}` record: {err}")));
                }
                tracing::debug!(kind, key, %err, "dropping invalid record");
            }
        }
    }
    Ok(out)
}

fn validate_ids<T>(
    records: Vec<T>,
    id: impl Fn(&T) -> &str,
    kind: &str,
    options: ParseOptions,
) -> Result<Vec<T>> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let record_id = id(&record);
        if record_id.is_empty() {
            if !options.suppress_errors {
                return Err(parse_error(kind, "record with empty id"));
            }
            tracing::debug!(kind, "dropping record with empty id");
            continue;
        }
        if !seen.insert(record_id.to_string()) {
            if !options.suppress_errors {
                return Err(parse_error(kind, format!("duplicate record id: {record_id}")));
            }
            tracing::debug!(kind, id = record_id, "dropping record with duplicate id");
            continue;
        }
        out.push(record);
    }
    Ok(out)
}

fn document_title(doc: &Value) -> Option<String> {
    doc.get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|t| !t.is_empty())
}

/// Parses a chord chart model out of a detected document.
///
/// In lenient mode invalid records (bad shape, empty or duplicate ids,
/// connections referencing unknown nodes) are dropped instead of failing
/// the parse.
pub fn parse_chord_model(doc: &Value, options: ParseOptions) -> Result<ChordChart> {
    let nodes = collect_records::<NodeRecord>(doc, "nodes", "chord", options)?;
    let nodes = validate_ids(nodes, |n| &n.id, "chord", options)?;

    let connections = if doc.get("connections").is_some() {
        let records = collect_records::<ConnectionRecord>(doc, "connections", "chord", options)?;
        let records = validate_ids(records, |c| &c.id, "chord", options)?;
        let node_ids: FxHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let unknown = [&record.source, &record.destination]
                .into_iter()
                .find(|id| !node_ids.contains(id.as_str()));
            if let Some(unknown) = unknown {
                if !options.suppress_errors {
                    return Err(parse_error(
                        "chord",
                        format!("connection `{}` references unknown node `{unknown}`", record.id),
                    ));
                }
                tracing::debug!(id = %record.id, node = %unknown, "dropping connection to unknown node");
                continue;
            }
            out.push(record);
        }
        Some(out)
    } else {
        None
    };

    Ok(ChordChart {
        kind: "chord".to_string(),
        title: document_title(doc),
        nodes,
        connections,
    })
}

/// Parses a bar chart model out of a detected document.
pub fn parse_bar_model(doc: &Value, options: ParseOptions) -> Result<BarChart> {
    let bars = collect_records::<BarRecord>(doc, "bars", "barChart", options)?;
    let bars = validate_ids(bars, |b| &b.id, "barChart", options)?;

    let mut out = Vec::with_capacity(bars.len());
    for bar in bars {
        if !bar.count.is_finite() || bar.count < 0.0 {
            if !options.suppress_errors {
                return Err(parse_error(
                    "barChart",
                    format!("bar `{}` has invalid count {}", bar.id, bar.count),
                ));
            }
            tracing::debug!(id = %bar.id, count = bar.count, "dropping bar with invalid count");
            continue;
        }
        out.push(bar);
    }

    Ok(BarChart {
        kind: "barChart".to_string(),
        title: document_title(doc),
        bars: out,
    })
}
