//! Thin helpers over `lopdf::Document`.

use lopdf::{Document, Object};

use crate::error::CoreError;

/// US Letter, the fallback when a page carries no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Parse PDF bytes into a document.
pub fn load_document(bytes: &[u8]) -> Result<Document, CoreError> {
    Document::load_mem(bytes).map_err(|e| CoreError::Parse(e.to_string()))
}

/// Serialize a document back to bytes.
pub fn save_document(doc: &mut Document) -> Result<Vec<u8>, CoreError> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| CoreError::Save(e.to_string()))?;
    Ok(buffer)
}

/// Parse PDF bytes and return the page count.
pub fn page_count(bytes: &[u8]) -> Result<u32, CoreError> {
    Ok(load_document(bytes)?.get_pages().len() as u32)
}

/// MediaBox of a page, resolving indirect references and walking up the
/// Pages tree with a depth limit on malformed files.
pub fn media_box(doc: &Document, page_id: lopdf::ObjectId) -> [f32; 4] {
    let Ok(page_obj) = doc.get_object(page_id) else {
        return DEFAULT_MEDIA_BOX;
    };
    media_box_recursive(doc, page_obj, 10)
}

fn media_box_recursive(doc: &Document, obj: &Object, depth: usize) -> [f32; 4] {
    if depth == 0 {
        return DEFAULT_MEDIA_BOX;
    }

    if let Object::Dictionary(dict) = obj {
        if let Ok(media_box_obj) = dict.get(b"MediaBox") {
            let arr = match media_box_obj {
                Object::Array(arr) => Some(arr),
                Object::Reference(ref_id) => match doc.get_object(*ref_id) {
                    Ok(Object::Array(arr)) => Some(arr),
                    _ => None,
                },
                _ => None,
            };

            if let Some(arr) = arr {
                let values: Vec<f32> = arr.iter().filter_map(as_number).collect();
                if values.len() == 4 {
                    return [values[0], values[1], values[2], values[3]];
                }
            }
        }

        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
            if let Ok(parent) = doc.get_object(*parent_id) {
                return media_box_recursive(doc, parent, depth - 1);
            }
        }
    }

    DEFAULT_MEDIA_BOX
}

/// Follow one level of indirection to a dictionary.
pub(crate) fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a lopdf::Dictionary> {
    match obj {
        Object::Dictionary(d) => Some(d),
        Object::Reference(id) => doc.get_object(*id).and_then(Object::as_dict).ok(),
        _ => None,
    }
}

pub(crate) fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
