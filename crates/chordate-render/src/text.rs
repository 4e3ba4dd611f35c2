use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::model::ArcSpan;
use chordate_core::geom;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 16.0,
            font_weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    pub fn normalized_text_lines(text: &str) -> Vec<String> {
        let t = text
            .replace("<br/>", "\n")
            .replace("<br />", "\n")
            .replace("<br>", "\n");
        let out = t.split('\n').map(|s| s.to_string()).collect::<Vec<_>>();
        if out.is_empty() {
            return vec!["".to_string()];
        }
        out
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let lines = Self::normalized_text_lines(text);
        let font_size = style.font_size.max(1.0);
        let mut max_cells = 0usize;
        for line in &lines {
            // Display cells, so wide (CJK) characters count double.
            max_cells = max_cells.max(UnicodeWidthStr::width(line.as_str()));
        }

        let width = max_cells as f64 * font_size * char_width_factor;
        let height = lines.len() as f64 * font_size * line_height_factor;
        TextMetrics {
            width,
            height,
            line_count: lines.len(),
        }
    }
}

const ELLIPSIS: &str = "...";

/// Text after fitting into some limited space. `truncated` tells whether any
/// characters were dropped (and therefore whether the ellipsis was appended).
#[derive(Debug, Clone, PartialEq)]
pub struct FittedText {
    pub text: String,
    pub truncated: bool,
}

impl FittedText {
    fn untouched(text: &str) -> Self {
        Self {
            text: text.to_string(),
            truncated: false,
        }
    }
}

/// Drops trailing characters until the measured width plus `margin` fits
/// within `limit`. Text that already fits is returned untouched; truncated
/// text gets an ellipsis suffix.
pub fn fit_text_to_limit(
    text: &str,
    limit: f64,
    margin: f64,
    style: &TextStyle,
    measurer: &dyn TextMeasurer,
) -> FittedText {
    let mut kept: Vec<char> = text.chars().collect();
    let mut truncated = false;
    loop {
        let candidate: String = kept.iter().collect();
        let width = measurer.measure(&candidate, style).width;
        if width + margin <= limit || kept.is_empty() {
            if !truncated {
                return FittedText::untouched(text);
            }
            return FittedText {
                text: format!("{candidate}{ELLIPSIS}"),
                truncated: true,
            };
        }
        kept.pop();
        truncated = true;
    }
}

/// Fits band label text to the arc length available at the band's mid radius.
pub fn fit_text_to_arc(
    text: &str,
    arc: &ArcSpan,
    margin: f64,
    style: &TextStyle,
    measurer: &dyn TextMeasurer,
) -> FittedText {
    let limit = geom::arc_length(arc.start_angle, arc.end_angle, arc.mid_radius());
    fit_text_to_limit(text, limit, margin, style, measurer)
}

/// Fits node label text to the chart container.
///
/// The label runs radially outwards from `radius` at `angle`; characters are
/// dropped while its projected endpoint (plus `margin`) overflows the
/// container's half extents on either axis.
pub fn fit_text_to_container(
    text: &str,
    container_width: f64,
    container_height: f64,
    angle: f64,
    radius: f64,
    margin: f64,
    style: &TextStyle,
    measurer: &dyn TextMeasurer,
) -> FittedText {
    let half_width = container_width / 2.0;
    let half_height = container_height / 2.0;

    let mut kept: Vec<char> = text.chars().collect();
    let mut truncated = false;
    loop {
        let candidate: String = kept.iter().collect();
        let width = measurer.measure(&candidate, style).width;
        let end_x = geom::polar_x(angle, radius + width);
        let end_y = geom::polar_y(angle, radius + width);
        let overflows = end_x.abs() + margin > half_width || end_y.abs() + margin > half_height;
        if !overflows || kept.is_empty() {
            if !truncated {
                return FittedText::untouched(text);
            }
            return FittedText {
                text: format!("{candidate}{ELLIPSIS}"),
                truncated: true,
            };
        }
        kept.pop();
        truncated = true;
    }
}
