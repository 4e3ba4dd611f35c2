use serde_json::Value;

fn default_segment_palette() -> Vec<String> {
    // d3 schemeCategory10, the palette the ordinal segment scale cycles through.
    "#1f77b4,#ff7f0e,#2ca02c,#d62728,#9467bd,#8c564b,#e377c2,#7f7f7f,#bcbd22,#17becf"
        .split(',')
        .map(|s| s.trim().to_string())
        .collect()
}

/// Ordinal color scale: keys get palette colors in first-seen order, cycling
/// when the palette runs out. Repeated keys keep their color.
#[derive(Debug, Clone)]
pub struct ColorScale {
    palette: Vec<String>,
    mapping: std::collections::HashMap<String, usize>,
    next: usize,
}

impl ColorScale {
    pub fn new_default() -> Self {
        Self {
            palette: default_segment_palette(),
            mapping: std::collections::HashMap::new(),
            next: 0,
        }
    }

    pub fn from_palette(palette: Vec<String>) -> Self {
        let palette = if palette.is_empty() {
            default_segment_palette()
        } else {
            palette
        };
        Self {
            palette,
            mapping: std::collections::HashMap::new(),
            next: 0,
        }
    }

    /// Reads a `palette` array (of color strings) from a chart config section.
    pub fn from_config_section(section: Option<&Value>) -> Self {
        let palette = section
            .and_then(|v| v.get("palette"))
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Self::from_palette(palette)
    }

    pub fn color_for(&mut self, key: &str) -> String {
        if let Some(idx) = self.mapping.get(key).copied() {
            return self.palette[idx % self.palette.len()].clone();
        }
        let idx = self.next;
        self.next += 1;
        self.mapping.insert(key.to_string(), idx);
        self.palette[idx % self.palette.len()].clone()
    }
}
