//! Text block extraction from page content streams.
//!
//! Walks the page's text-object operators tracking position and font state,
//! then groups the resulting runs into visual lines so that each block
//! carries one semantic line of text. Translating whole lines instead of
//! isolated sub-phrases keeps grammar and word order intact.

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use crate::block::{Alignment, BoundingBox, TextBlock};
use crate::document::{as_number, media_box, resolve_dict};
use crate::error::CoreError;
use crate::metrics::{text_width, ASCENT, DESCENT, LINE_HEIGHT_FACTOR};

/// A single positioned show-text run before line grouping.
struct TextRun {
    x: f32,
    y: f32,
    width: f32,
    font_size: f32,
    font_name: String,
    text: String,
}

/// Extract the text blocks of one page in natural reading order
/// (top-to-bottom, then left-to-right within a line).
///
/// Whitespace-only blocks are dropped. The page is not mutated. A page
/// whose content stream cannot be fetched or decoded yields
/// [`CoreError::PageStructure`]; callers treat that as a per-page warning,
/// not a document failure.
pub fn extract_blocks(
    doc: &Document,
    page_num: u32,
    page_id: ObjectId,
) -> Result<Vec<TextBlock>, CoreError> {
    let content_bytes = doc
        .get_page_content(page_id)
        .map_err(|e| CoreError::PageStructure {
            page: page_num,
            reason: format!("content stream unavailable: {}", e),
        })?;

    let content = Content::decode(&content_bytes).map_err(|e| CoreError::PageStructure {
        page: page_num,
        reason: format!("content stream malformed: {}", e),
    })?;

    let runs = collect_runs(&content);
    let page_box = media_box(doc, page_id);
    let mut blocks = group_into_blocks(runs, &page_box);

    // Resolve resource names like "F1" to the font's BaseFont so the hint
    // carries weight and slant for the rewriter.
    for block in &mut blocks {
        if let Some(base) = base_font_name(doc, page_id, &block.font_hint) {
            block.font_hint = base;
        }
    }

    tracing::debug!(page_num, blocks = blocks.len(), "extracted text blocks");
    Ok(blocks)
}

fn collect_runs(content: &Content) -> Vec<TextRun> {
    let mut runs = Vec::new();

    let mut font_size: f32 = 0.0;
    let mut font_name = String::new();
    let mut leading: f32 = 0.0;
    let mut line_start = (0.0_f32, 0.0_f32);
    let mut cursor_x: f32 = 0.0;

    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "BT" => {
                line_start = (0.0, 0.0);
                cursor_x = 0.0;
            }
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    font_name = String::from_utf8_lossy(name).into_owned();
                }
                if let Some(size) = operands.get(1).and_then(as_number) {
                    font_size = size;
                }
            }
            "TL" => {
                if let Some(l) = operands.first().and_then(as_number) {
                    leading = l;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(as_number),
                    operands.get(1).and_then(as_number),
                ) {
                    line_start.0 += tx;
                    line_start.1 += ty;
                    cursor_x = line_start.0;
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(as_number),
                    operands.get(1).and_then(as_number),
                ) {
                    leading = -ty;
                    line_start.0 += tx;
                    line_start.1 += ty;
                    cursor_x = line_start.0;
                }
            }
            "Tm" => {
                if let (Some(e), Some(f)) = (
                    operands.get(4).and_then(as_number),
                    operands.get(5).and_then(as_number),
                ) {
                    line_start = (e, f);
                    cursor_x = e;
                }
            }
            "T*" => {
                line_start.1 -= effective_leading(leading, font_size);
                cursor_x = line_start.0;
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    push_run(
                        &mut runs,
                        bytes,
                        &mut cursor_x,
                        line_start.1,
                        font_size,
                        &font_name,
                    );
                }
            }
            "'" => {
                line_start.1 -= effective_leading(leading, font_size);
                cursor_x = line_start.0;
                if let Some(Object::String(bytes, _)) = operands.first() {
                    push_run(
                        &mut runs,
                        bytes,
                        &mut cursor_x,
                        line_start.1,
                        font_size,
                        &font_name,
                    );
                }
            }
            "\"" => {
                line_start.1 -= effective_leading(leading, font_size);
                cursor_x = line_start.0;
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    push_run(
                        &mut runs,
                        bytes,
                        &mut cursor_x,
                        line_start.1,
                        font_size,
                        &font_name,
                    );
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => {
                                push_run(
                                    &mut runs,
                                    bytes,
                                    &mut cursor_x,
                                    line_start.1,
                                    font_size,
                                    &font_name,
                                );
                            }
                            other => {
                                if let Some(adjust) = as_number(other) {
                                    cursor_x -= adjust / 1000.0 * font_size;
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    runs
}

fn effective_leading(leading: f32, font_size: f32) -> f32 {
    if leading > 0.0 {
        leading
    } else {
        font_size * LINE_HEIGHT_FACTOR
    }
}

fn push_run(
    runs: &mut Vec<TextRun>,
    bytes: &[u8],
    cursor_x: &mut f32,
    y: f32,
    font_size: f32,
    font_name: &str,
) {
    let text = decode_text_bytes(bytes);
    if text.is_empty() || font_size <= 0.0 {
        return;
    }
    let width = text_width(&text, font_size);
    runs.push(TextRun {
        x: *cursor_x,
        y,
        width,
        font_size,
        font_name: font_name.to_string(),
        text,
    });
    *cursor_x += width;
}

/// Content-stream strings are usually font-encoded; without the font's
/// CMap the pragmatic reading is UTF-8 with a Latin-1 fallback.
fn decode_text_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn group_into_blocks(mut runs: Vec<TextRun>, page_box: &[f32; 4]) -> Vec<TextBlock> {
    // Top-to-bottom by baseline, then left-to-right.
    runs.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut blocks = Vec::new();
    let mut line: Vec<TextRun> = Vec::new();

    for run in runs {
        let same_line = line
            .first()
            .map(|anchor: &TextRun| (anchor.y - run.y).abs() <= 0.5 * anchor.font_size.max(1.0))
            .unwrap_or(false);

        if same_line {
            line.push(run);
        } else {
            if let Some(block) = merge_line(&mut line, page_box) {
                blocks.push(block);
            }
            line = vec![run];
        }
    }
    if let Some(block) = merge_line(&mut line, page_box) {
        blocks.push(block);
    }

    blocks
}

/// Merge the runs of one visual line into a single block.
fn merge_line(line: &mut Vec<TextRun>, page_box: &[f32; 4]) -> Option<TextBlock> {
    if line.is_empty() {
        return None;
    }
    line.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    let font_size = line
        .iter()
        .map(|r| r.font_size)
        .fold(f32::MIN, f32::max)
        .max(1.0);
    let baseline = line[0].y;
    let font_hint = line[0].font_name.clone();

    let mut text = String::new();
    let mut prev_end: Option<f32> = None;
    for run in line.iter() {
        if let Some(end) = prev_end {
            let gap = run.x - end;
            if gap > 0.2 * font_size && !text.ends_with(' ') && !run.text.starts_with(' ') {
                text.push(' ');
            }
        }
        text.push_str(&run.text);
        prev_end = Some(run.x + run.width);
    }

    if text.trim().is_empty() {
        return None;
    }

    let x0 = line[0].x;
    let x1 = line
        .iter()
        .map(|r| r.x + r.width)
        .fold(f32::MIN, f32::max);
    let bbox = BoundingBox::new(
        x0,
        baseline - DESCENT * font_size,
        x1.max(x0 + 1.0),
        baseline + ASCENT * font_size,
    )?;

    let alignment = infer_alignment(&bbox, page_box);

    Some(TextBlock {
        bbox,
        text: text.trim().to_string(),
        font_size,
        font_hint,
        alignment,
    })
}

/// Resolve a `Tf` resource name to the font's `BaseFont` name, walking up
/// the page tree for inherited resources.
fn base_font_name(doc: &Document, page_id: ObjectId, resource_name: &str) -> Option<String> {
    let mut dict = doc.get_object(page_id).and_then(Object::as_dict).ok()?;
    for _ in 0..10 {
        let font = dict
            .get(b"Resources")
            .ok()
            .and_then(|obj| resolve_dict(doc, obj))
            .and_then(|res| res.get(b"Font").ok())
            .and_then(|obj| resolve_dict(doc, obj))
            .and_then(|fonts| fonts.get(resource_name.as_bytes()).ok())
            .and_then(|obj| resolve_dict(doc, obj));
        if let Some(font) = font {
            if let Ok(Object::Name(base)) = font.get(b"BaseFont") {
                return Some(String::from_utf8_lossy(base).into_owned());
            }
        }
        let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") else {
            return None;
        };
        dict = doc.get_object(*parent_id).and_then(Object::as_dict).ok()?;
    }
    None
}

/// Guess a line's alignment from its margins against the page box.
fn infer_alignment(bbox: &BoundingBox, page_box: &[f32; 4]) -> Alignment {
    let page_width = (page_box[2] - page_box[0]).max(1.0);
    let left = bbox.x0 - page_box[0];
    let right = page_box[2] - bbox.x1;

    if (left - right).abs() < 0.1 * page_width && left > 0.15 * page_width {
        Alignment::Center
    } else if right < 0.05 * page_width && left > 0.3 * page_width {
        Alignment::Right
    } else {
        Alignment::Left
    }
}
