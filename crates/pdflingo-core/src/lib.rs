//! Layout-preserving PDF translation primitives.
//!
//! This crate provides the page-level machinery for substituting translated
//! text into a PDF while keeping the original visual layout:
//!
//! - [`extract::extract_blocks`]: positioned text blocks in reading order
//! - [`reflow::fit`]: wrap and size translated text for a bounding box
//! - [`rewrite::apply`]: erase the original region and draw the plan
//! - [`translate::Translator`]: the pluggable translation capability
//!
//! Job orchestration (chunking, progress, cancellation) lives in the
//! `pdflingo-jobs` crate.

pub mod block;
pub mod document;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod reflow;
pub mod rewrite;
pub mod translate;

pub use block::{overlapping_pairs, Alignment, BoundingBox, TextBlock};
pub use document::{load_document, media_box, page_count, save_document};
pub use error::{CoreError, TranslationError};
pub use extract::extract_blocks;
pub use reflow::{fit, RenderPlan, MIN_FONT_SIZE, SHRINK_FACTOR};
pub use rewrite::{apply, FontVariant};
pub use translate::{CachingTranslator, Translator};
