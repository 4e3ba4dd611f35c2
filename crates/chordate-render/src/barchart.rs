use crate::model::{BarChartLayout, BarLayout, Bounds};
use crate::text::{TextMeasurer, TextStyle, fit_text_to_limit};
use crate::theme::ColorScale;
use crate::Result;
use chordate_core::aggregate::max_by_value;
use chordate_core::{BarChart, LinearScale};
use serde_json::Value;

/// Bars take this share of their horizontal slot; the rest is gutter.
const BAR_WIDTH_TO_SLOT_RATIO: f64 = 0.7;

#[derive(Debug, Clone)]
struct BarChartConfig {
    width: f64,
    height: f64,
    label_offset: f64,
    label_margin: f64,
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

fn default_bar_chart_config() -> BarChartConfig {
    BarChartConfig {
        width: 800.0,
        height: 600.0,
        label_offset: 20.0,
        label_margin: 10.0,
        font_family: None,
        font_size: 16.0,
    }
}

fn parse_bar_chart_config(effective_config: &Value) -> BarChartConfig {
    let base = default_bar_chart_config();
    BarChartConfig {
        width: config_f64(effective_config, &["barChart", "width"]).unwrap_or(base.width),
        height: config_f64(effective_config, &["barChart", "height"]).unwrap_or(base.height),
        label_offset: config_f64(effective_config, &["barChart", "labelOffset"])
            .unwrap_or(base.label_offset),
        label_margin: config_f64(effective_config, &["barChart", "labelMargin"])
            .unwrap_or(base.label_margin),
        font_family: config_string(effective_config, &["fontFamily"]).or(base.font_family),
        font_size: config_f64(effective_config, &["fontSize"]).unwrap_or(base.font_size),
    }
}

pub fn layout_bar_chart(
    chart: &BarChart,
    effective_config: &Value,
    measurer: &dyn TextMeasurer,
) -> Result<BarChartLayout> {
    let cfg = parse_bar_chart_config(effective_config);
    let label_style = TextStyle {
        font_family: cfg.font_family.clone(),
        font_size: cfg.font_size,
        font_weight: None,
    };

    tracing::debug!(bars = chart.bars.len(), "computing bar chart layout");

    // Bars fill the area above the label strip and grow upward from its edge.
    let label_line_height = measurer.measure("M", &label_style).height;
    let plot_height = (cfg.height - cfg.label_offset - label_line_height).max(0.0);
    let max_count = max_by_value(&chart.bars, |bar| Some(bar.count)).unwrap_or(0.0);
    let value_scale = LinearScale::new(0.0, max_count, 0.0, plot_height);

    let mut color_scale = ColorScale::from_config_section(effective_config.get("barChart"));

    let slot_width = if chart.bars.is_empty() {
        cfg.width
    } else {
        cfg.width / chart.bars.len() as f64
    };
    let bar_width = slot_width * BAR_WIDTH_TO_SLOT_RATIO;

    let mut bars = Vec::with_capacity(chart.bars.len());
    for (index, record) in chart.bars.iter().enumerate() {
        let bar_height = if max_count > 0.0 {
            value_scale.map(record.count)
        } else {
            0.0
        };
        let slot_start = index as f64 * slot_width;
        let fitted = fit_text_to_limit(
            &record.label,
            slot_width,
            cfg.label_margin,
            &label_style,
            measurer,
        );
        let color = match &record.color {
            Some(color) => color.clone(),
            None => color_scale.color_for(&record.id),
        };

        bars.push(BarLayout {
            id: record.id.clone(),
            label: record.label.clone(),
            display_label: fitted.text,
            color,
            count: record.count,
            x: slot_start + (slot_width - bar_width) / 2.0,
            y: plot_height - bar_height,
            width: bar_width,
            height: bar_height,
            label_x: slot_start + slot_width / 2.0,
            label_y: plot_height + cfg.label_offset,
        });
    }

    Ok(BarChartLayout {
        bounds: Some(Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: cfg.width,
            max_y: cfg.height,
        }),
        width: cfg.width,
        height: cfg.height,
        title: chart.title.clone(),
        bars,
    })
}
