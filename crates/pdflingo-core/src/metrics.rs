//! Approximate glyph metrics for layout decisions.
//!
//! Widths are expressed in 1/1000 em units, bucketed into a handful of
//! classes that track Helvetica closely enough for fitting decisions.
//! The output only has to be visually equivalent, so exact AFM tables are
//! not carried; what matters is that the same text always measures the same.

/// Line height as a multiple of font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Glyph extent above the baseline, as a fraction of font size.
pub const ASCENT: f32 = 0.95;

/// Glyph extent below the baseline, as a fraction of font size.
pub const DESCENT: f32 = LINE_HEIGHT_FACTOR - ASCENT;

/// Width of a single character in 1/1000 em units.
fn char_units(c: char) -> u32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ';' | ':' | '\'' | '|' | '!' => 278,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' | '/' | ' ' => 333,
        'm' | 'M' | 'W' => 889,
        'w' => 722,
        'A'..='Z' => 667,
        '0'..='9' => 556,
        c if (c as u32) < 128 => 556,
        // Non-Latin scripts tend to run wider; err on the side of wrapping.
        _ => 722,
    }
}

/// Rendered width of `text` at `font_size`, in points.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text.chars().map(char_units).sum();
    units as f32 / 1000.0 * font_size
}

/// Vertical space one line occupies at `font_size`, in points.
pub fn line_height(font_size: f32) -> f32 {
    font_size * LINE_HEIGHT_FACTOR
}
