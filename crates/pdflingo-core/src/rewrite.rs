//! Applying render plans to page content.
//!
//! Substitution is a two-step content fragment appended to the page's
//! `Contents`: a white rectangle filling exactly the block's bounding box,
//! then the plan's lines drawn inside the box. Nothing outside the box is
//! touched, and every pre-existing content object stays byte-for-byte
//! intact.

use std::fmt::Write as _;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::block::{Alignment, TextBlock};
use crate::document::resolve_dict;
use crate::error::CoreError;
use crate::metrics::{line_height, text_width, ASCENT};
use crate::reflow::RenderPlan;

/// Base-14 font the replacement text is drawn with, chosen from the
/// block's extracted font hint: uniform Helvetica for prose, Courier for
/// code-like fonts, keeping weight and slant where the hint shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontVariant {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
    CourierBold,
}

impl FontVariant {
    /// Classify a base-font name such as "Arial-BoldMT" or
    /// "CourierNewPS-ItalicMT". Unrecognizable hints fall back to plain
    /// Helvetica.
    pub fn from_hint(hint: &str) -> Self {
        let f: String = hint
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let bold = f.contains("bold");
        let slanted = f.contains("italic") || f.contains("oblique");

        if f.contains("courier") || f.contains("mono") || f.contains("console") {
            if bold {
                FontVariant::CourierBold
            } else {
                FontVariant::Courier
            }
        } else if bold && slanted {
            FontVariant::HelveticaBoldOblique
        } else if bold {
            FontVariant::HelveticaBold
        } else if slanted {
            FontVariant::HelveticaOblique
        } else {
            FontVariant::Helvetica
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            FontVariant::Helvetica => "Helvetica",
            FontVariant::HelveticaBold => "Helvetica-Bold",
            FontVariant::HelveticaOblique => "Helvetica-Oblique",
            FontVariant::HelveticaBoldOblique => "Helvetica-BoldOblique",
            FontVariant::Courier => "Courier",
            FontVariant::CourierBold => "Courier-Bold",
        }
    }

    /// Per-page resource name the variant is registered under.
    fn resource_name(self) -> &'static str {
        match self {
            FontVariant::Helvetica => "PLF1",
            FontVariant::HelveticaBold => "PLF2",
            FontVariant::HelveticaOblique => "PLF3",
            FontVariant::HelveticaBoldOblique => "PLF4",
            FontVariant::Courier => "PLF5",
            FontVariant::CourierBold => "PLF6",
        }
    }
}

/// Erase the block's region and draw the plan's lines into it.
///
/// Mutates the page in place. Application order across non-overlapping
/// blocks on the same page does not matter; for overlapping boxes the last
/// application wins.
pub fn apply(
    doc: &mut Document,
    page_id: ObjectId,
    block: &TextBlock,
    plan: &RenderPlan,
) -> Result<(), CoreError> {
    let variant = FontVariant::from_hint(&block.font_hint);
    if !plan.is_empty() {
        ensure_font_resource(doc, page_id, variant)?;
    }

    let fragment = content_fragment(block, plan, variant.resource_name());
    append_content_to_page(doc, page_id, fragment)
}

/// Build the PDF content fragment for one block substitution.
fn content_fragment(block: &TextBlock, plan: &RenderPlan, font_resource: &str) -> Vec<u8> {
    let bbox = &block.bbox;
    let mut ops = String::new();

    ops.push_str("q\n");

    // Cover the original text. Exactly the bounding box, no padding.
    ops.push_str("1 1 1 rg\n");
    let _ = writeln!(
        ops,
        "{} {} {} {} re f",
        fmt_num(bbox.x0),
        fmt_num(bbox.y0),
        fmt_num(bbox.width()),
        fmt_num(bbox.height())
    );

    ops.push_str("0 0 0 rg\n");

    let mut fragment = ops.into_bytes();
    let size = plan.font_size;
    let lh = line_height(size);

    for (i, line) in plan.lines.iter().enumerate() {
        let line_width = text_width(line, size);
        let y = bbox.y1 - ASCENT * size - i as f32 * lh;
        let is_last = i + 1 == plan.lines.len();
        let (x, word_spacing) = match block.alignment {
            Alignment::Left => (bbox.x0, 0.0),
            Alignment::Center => (bbox.x0 + (bbox.width() - line_width).max(0.0) / 2.0, 0.0),
            Alignment::Right => (bbox.x1 - line_width.min(bbox.width()), 0.0),
            Alignment::Justify => (bbox.x0, justify_spacing(line, line_width, bbox.width(), is_last)),
        };

        let mut text_ops = String::new();
        text_ops.push_str("BT\n");
        let _ = writeln!(text_ops, "/{} {} Tf", font_resource, fmt_num(size));
        let _ = writeln!(text_ops, "{} Tw", fmt_num(word_spacing));
        let _ = writeln!(text_ops, "{} {} Td", fmt_num(x), fmt_num(y));
        fragment.extend_from_slice(text_ops.as_bytes());

        fragment.push(b'(');
        fragment.extend_from_slice(&encode_literal(line));
        fragment.extend_from_slice(b") Tj\nET\n");
    }

    fragment.extend_from_slice(b"Q\n");
    fragment
}

/// Extra word spacing that stretches a justified line to the box width.
fn justify_spacing(line: &str, line_width: f32, box_width: f32, is_last: bool) -> f32 {
    if is_last {
        return 0.0;
    }
    let gaps = line.matches(' ').count();
    if gaps == 0 {
        return 0.0;
    }
    ((box_width - line_width) / gaps as f32).max(0.0)
}

/// Encode a line as a literal-string body: WinAnsi bytes with the three
/// delimiter characters escaped. Characters outside Latin-1 degrade to '?'.
fn encode_literal(line: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len());
    for c in line.chars() {
        let byte = if (c as u32) < 256 { c as u8 } else { b'?' };
        if byte == b'(' || byte == b')' || byte == b'\\' {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out
}

fn fmt_num(v: f32) -> String {
    // Two decimals is below visual resolution and keeps streams stable.
    format!("{:.2}", v)
}

/// Append a content fragment to the page's `Contents` without disturbing
/// the existing streams.
fn append_content_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    fragment: Vec<u8>,
) -> Result<(), CoreError> {
    let content_id = doc.add_object(Object::Stream(Stream::new(Dictionary::new(), fragment)));

    let page = doc
        .get_object_mut(page_id)
        .map_err(|e| CoreError::Render(format!("page object unavailable: {}", e)))?;

    let Object::Dictionary(dict) = page else {
        return Err(CoreError::Render("page object is not a dictionary".into()));
    };

    match dict.get(b"Contents").ok().cloned() {
        Some(Object::Reference(existing)) => {
            dict.set(
                "Contents",
                Object::Array(vec![
                    Object::Reference(existing),
                    Object::Reference(content_id),
                ]),
            );
        }
        Some(Object::Array(mut arr)) => {
            arr.push(Object::Reference(content_id));
            dict.set("Contents", Object::Array(arr));
        }
        _ => {
            dict.set("Contents", Object::Reference(content_id));
        }
    }

    Ok(())
}

/// Register the variant's font on the page's resources once.
///
/// Pages inheriting `Resources` from the page tree get a page-level copy of
/// the inherited dictionary first, so existing font references keep
/// resolving.
fn ensure_font_resource(
    doc: &mut Document,
    page_id: ObjectId,
    variant: FontVariant,
) -> Result<(), CoreError> {
    let name = variant.resource_name();
    if has_translation_font(doc, page_id, name) {
        return Ok(());
    }

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => variant.base_font(),
        "Encoding" => "WinAnsiEncoding",
    });

    enum Target {
        Indirect(ObjectId),
        Inline(Dictionary),
    }

    let target = {
        let dict = page_dict(doc, page_id)?;
        match dict.get(b"Resources") {
            Ok(Object::Reference(id)) => Target::Indirect(*id),
            Ok(Object::Dictionary(d)) => Target::Inline(d.clone()),
            _ => Target::Inline(inherited_resources(doc, page_id)),
        }
    };

    match target {
        Target::Indirect(res_id) => {
            let chase = {
                let res = doc
                    .get_object_mut(res_id)
                    .and_then(Object::as_dict_mut)
                    .map_err(|e| CoreError::Render(format!("resources unavailable: {}", e)))?;
                set_font_entry(res, name, font_id)
            };
            if let Some(fonts_id) = chase {
                set_font_in_indirect(doc, fonts_id, name, font_id)?;
            }
        }
        Target::Inline(mut res) => {
            let chase = set_font_entry(&mut res, name, font_id);
            if let Some(fonts_id) = chase {
                set_font_in_indirect(doc, fonts_id, name, font_id)?;
            }
            let page = doc
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| CoreError::Render(format!("page object unavailable: {}", e)))?;
            page.set("Resources", Object::Dictionary(res));
        }
    }

    Ok(())
}

/// Insert the font into the resources' `Font` entry. Returns the object id
/// to mutate instead when `Font` is itself an indirect reference.
fn set_font_entry(res: &mut Dictionary, name: &str, font_id: ObjectId) -> Option<ObjectId> {
    match res.get(b"Font").ok().cloned() {
        Some(Object::Reference(fonts_id)) => Some(fonts_id),
        Some(Object::Dictionary(mut fonts)) => {
            fonts.set(name, Object::Reference(font_id));
            res.set("Font", Object::Dictionary(fonts));
            None
        }
        _ => {
            let mut fonts = Dictionary::new();
            fonts.set(name, Object::Reference(font_id));
            res.set("Font", Object::Dictionary(fonts));
            None
        }
    }
}

fn set_font_in_indirect(
    doc: &mut Document,
    fonts_id: ObjectId,
    name: &str,
    font_id: ObjectId,
) -> Result<(), CoreError> {
    let fonts = doc
        .get_object_mut(fonts_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| CoreError::Render(format!("font dictionary unavailable: {}", e)))?;
    fonts.set(name, Object::Reference(font_id));
    Ok(())
}

fn has_translation_font(doc: &Document, page_id: ObjectId, name: &str) -> bool {
    let Ok(page) = doc.get_object(page_id).and_then(Object::as_dict) else {
        return false;
    };
    let resources = match page.get(b"Resources") {
        Ok(obj) => resolve_dict(doc, obj),
        Err(_) => None,
    };
    let Some(resources) = resources else {
        return false;
    };
    let Ok(fonts_obj) = resources.get(b"Font") else {
        return false;
    };
    resolve_dict(doc, fonts_obj)
        .map(|fonts| fonts.has(name.as_bytes()))
        .unwrap_or(false)
}

/// Nearest `Resources` dictionary inherited from the page tree, cloned so
/// it can be materialized at page level.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut current = doc.get_object(page_id).and_then(Object::as_dict).ok();
    for _ in 0..10 {
        let Some(dict) = current else { break };
        let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") else {
            break;
        };
        let Ok(parent) = doc.get_object(*parent_id).and_then(Object::as_dict) else {
            break;
        };
        if let Ok(res_obj) = parent.get(b"Resources") {
            if let Some(res) = resolve_dict(doc, res_obj) {
                return res.clone();
            }
        }
        current = Some(parent);
    }
    Dictionary::new()
}

fn page_dict(doc: &Document, page_id: ObjectId) -> Result<&Dictionary, CoreError> {
    doc.get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| CoreError::Render(format!("page object unavailable: {}", e)))
}
