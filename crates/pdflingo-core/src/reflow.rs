//! Fitting translated text back into the original bounding box.
//!
//! Translations rarely match the source length, so the text is re-wrapped
//! and, when necessary, the font size is stepped down before any content is
//! dropped. The computation is pure: the same inputs always produce the
//! same plan.

use serde::{Deserialize, Serialize};

use crate::block::BoundingBox;
use crate::metrics::{line_height, text_width};

/// Smallest font size the engine will shrink to before truncating.
pub const MIN_FONT_SIZE: f32 = 5.0;

/// Multiplier applied to the font size on each shrink round.
pub const SHRINK_FACTOR: f32 = 0.9;

/// Wrapped-and-sized text ready to draw into a bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub lines: Vec<String>,
    pub font_size: f32,
    /// Set when content had to be cut to satisfy the box at the minimum
    /// allowed font size.
    pub truncated: bool,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Compute a plan that fits `text` inside `bbox`.
///
/// Starts at `base_font_size` and greedily wraps at word boundaries; if the
/// wrapped text is too tall, shrinks the font by [`SHRINK_FACTOR`] and
/// re-wraps, down to [`MIN_FONT_SIZE`]. Only then are whole lines dropped
/// from the end and the plan marked truncated. Alignment is applied at draw
/// time and does not influence fitting.
pub fn fit(text: &str, bbox: &BoundingBox, base_font_size: f32) -> RenderPlan {
    if text.trim().is_empty() {
        return RenderPlan {
            lines: Vec::new(),
            font_size: base_font_size,
            truncated: false,
        };
    }

    let max_width = bbox.width();
    let max_height = bbox.height();
    let mut font_size = base_font_size.max(MIN_FONT_SIZE);

    loop {
        let lines = wrap(text, max_width, font_size);
        if fits(&lines, max_width, max_height, font_size) {
            return RenderPlan {
                lines,
                font_size,
                truncated: false,
            };
        }
        if font_size <= MIN_FONT_SIZE {
            break;
        }
        font_size = (font_size * SHRINK_FACTOR).max(MIN_FONT_SIZE);
    }

    // Floor reached: keep as many leading lines as the box can hold.
    let mut lines = wrap(text, max_width, font_size);
    if lines.iter().any(|l| text_width(l, font_size) > max_width) {
        // Even a single character exceeds the box width.
        lines.clear();
    } else {
        let max_lines = (max_height / line_height(font_size)).floor() as usize;
        lines.truncate(max_lines);
    }

    RenderPlan {
        lines,
        font_size,
        truncated: true,
    }
}

fn fits(lines: &[String], max_width: f32, max_height: f32, font_size: f32) -> bool {
    let total_height = lines.len() as f32 * line_height(font_size);
    total_height <= max_height
        && lines.iter().all(|l| text_width(l, font_size) <= max_width)
}

/// Greedy word wrap; words wider than `max_width` are split at character
/// boundaries as a last resort.
fn wrap(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let space_width = text_width(" ", font_size);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width: f32 = 0.0;

    for word in text.split_whitespace() {
        let word_width = text_width(word, font_size);

        if word_width > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            for c in word.chars() {
                let char_width = text_width(c.encode_utf8(&mut [0; 4]), font_size);
                if current_width + char_width > max_width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.push(c);
                current_width += char_width;
            }
            continue;
        }

        if current.is_empty() {
            current = word.to_string();
            current_width = word_width;
        } else if current_width + space_width + word_width <= max_width {
            current.push(' ');
            current.push_str(word);
            current_width += space_width + word_width;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
            current_width = word_width;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
