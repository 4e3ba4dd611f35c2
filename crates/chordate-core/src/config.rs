use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig(Value);

impl Default for ChartConfig {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl ChartConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn as_value_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        cur.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        cur.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        cur.as_f64()
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // `from_value` accepts arbitrary JSON, so the root may not be an object yet.
        // Path insertion needs a map at every level; non-objects are replaced.
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

/// Schema defaults every engine starts from. Site config and per-document
/// config are deep-merged on top, in that order.
pub fn default_site_config() -> ChartConfig {
    ChartConfig::from_value(serde_json::json!({
        "fontFamily": "helvetica, arial, sans-serif",
        "fontSize": 16.0,
        "chord": {
            "width": 800.0,
            "height": 600.0,
            "labelOffset": 120.0,
            "bandThickness": 30.0,
            "nodeSize": 12.0,
            "arcLabelMargin": 40.0,
            "containerLabelMargin": 50.0,
            "loopRadius": 100.0,
        },
        "barChart": {
            "width": 800.0,
            "height": 600.0,
            "labelOffset": 20.0,
            "labelMargin": 10.0,
        },
    }))
}
