//! Positioned text regions extracted from a page.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    /// Build a box, returning `None` unless `x0 < x1` and `y0 < y1`.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Option<Self> {
        if x0 < x1 && y0 < y1 {
            Some(Self { x0, y0, x1, y1 })
        } else {
            None
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

/// Horizontal alignment hint for re-drawing translated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

/// One visual line of text on a page, with its position and base style.
///
/// Blocks are recomputed on every page scan and consumed immediately by the
/// reflow step; they are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub bbox: BoundingBox,
    pub text: String,
    pub font_size: f32,
    pub font_hint: String,
    pub alignment: Alignment,
}

/// Indices of block pairs whose bounding boxes overlap.
///
/// Overlapping regions are a degenerate input: substitution still applies in
/// block order (last-applied wins) but callers should surface the condition.
pub fn overlapping_pairs(blocks: &[TextBlock]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..blocks.len() {
        for j in (i + 1)..blocks.len() {
            if blocks[i].bbox.intersects(&blocks[j].bbox) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_at(x0: f32, y0: f32, x1: f32, y1: f32) -> TextBlock {
        TextBlock {
            bbox: BoundingBox::new(x0, y0, x1, y1).unwrap(),
            text: "x".to_string(),
            font_size: 12.0,
            font_hint: "Helvetica".to_string(),
            alignment: Alignment::Left,
        }
    }

    #[test]
    fn test_bounding_box_rejects_degenerate() {
        assert!(BoundingBox::new(10.0, 10.0, 10.0, 20.0).is_none());
        assert!(BoundingBox::new(10.0, 30.0, 20.0, 20.0).is_none());
        assert!(BoundingBox::new(10.0, 10.0, 20.0, 20.0).is_some());
    }

    #[test]
    fn test_union_contains_both() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap();
        let b = BoundingBox::new(5.0, 5.0, 20.0, 30.0).unwrap();
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(0.0, 0.0, 20.0, 30.0).unwrap());
    }

    #[test]
    fn test_disjoint_boxes_do_not_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap();
        let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0).unwrap();
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_overlapping_pairs_found() {
        let blocks = vec![
            block_at(0.0, 0.0, 100.0, 20.0),
            block_at(50.0, 10.0, 150.0, 30.0),
            block_at(200.0, 0.0, 300.0, 20.0),
        ];
        assert_eq!(overlapping_pairs(&blocks), vec![(0, 1)]);
    }
}
