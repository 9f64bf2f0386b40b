//! Chunked job execution.
//!
//! Drives one document through extract -> translate -> reflow -> rewrite,
//! page by page within fixed-size chunks. Chunking bounds the interval
//! between progress updates and gives cancellation a worst-case latency of
//! one page, independent of document size. The runner is fully sequential:
//! it mutates a single document, so ordering is a requirement rather than
//! an optimization opportunity.

use lopdf::ObjectId;
use tracing::{debug, info};

use pdflingo_core::{
    extract_blocks, fit, load_document, overlapping_pairs, rewrite, save_document, CoreError,
    Translator,
};

use crate::error::JobError;
use crate::state::JobHandle;

/// Pages per progress-reporting chunk unless the caller overrides it.
pub const DEFAULT_CHUNK_SIZE_PAGES: u32 = 20;

/// Run one translation job to a terminal state.
///
/// Every outcome, including fatal failures, is reported through `handle`;
/// nothing panics or propagates across this boundary.
pub fn run_job(
    pdf_bytes: &[u8],
    chunk_size_pages: u32,
    handle: &JobHandle,
    translator: &dyn Translator,
) {
    match run_inner(pdf_bytes, chunk_size_pages, handle, translator) {
        Ok(()) => {}
        Err(JobError::Cancelled) => handle.cancelled(),
        Err(JobError::Fatal(e)) => handle.fail(&e.to_string()),
    }
}

fn run_inner(
    pdf_bytes: &[u8],
    chunk_size_pages: u32,
    handle: &JobHandle,
    translator: &dyn Translator,
) -> Result<(), JobError> {
    let chunk_size = chunk_size_pages.max(1) as usize;
    let (source_lang, target_lang) = {
        let s = handle.snapshot();
        (s.source_lang, s.target_lang)
    };

    let mut doc = load_document(pdf_bytes)?;
    let pages: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
    let total_pages = pages.len() as u32;
    let total_chunks = total_pages.div_ceil(chunk_size as u32);

    handle.start(total_pages, total_chunks);
    info!(
        total_pages,
        total_chunks, %source_lang, %target_lang, "starting translation job"
    );

    if total_pages == 0 {
        let output = save_document(&mut doc)?;
        handle.complete(output, "document contains no processable pages");
        return Ok(());
    }

    for (chunk_index, chunk) in pages.chunks(chunk_size).enumerate() {
        let chunk_no = chunk_index as u32 + 1;
        let first_page = chunk[0].0;
        let last_page = chunk[chunk.len() - 1].0;
        handle.begin_chunk(chunk_no, first_page, last_page);

        for &(page_num, page_id) in chunk {
            // Cancellation checkpoint: between pages, never mid-block.
            if handle.cancel_requested() {
                return Err(JobError::Cancelled);
            }

            translate_page(
                &mut doc,
                page_num,
                page_id,
                &source_lang,
                &target_lang,
                handle,
                translator,
            )?;

            handle.page_done(page_num);
        }
    }

    let output = save_document(&mut doc)?;
    handle.complete(output, "translation completed successfully");
    info!("translation job completed");
    Ok(())
}

/// Translate and rewrite every text block of one page.
///
/// A structurally unreadable page is skipped with a warning; a failing
/// translation keeps the block's original text. Only rewrite failures are
/// fatal, since they indicate the document can no longer be written to.
fn translate_page(
    doc: &mut lopdf::Document,
    page_num: u32,
    page_id: ObjectId,
    source_lang: &str,
    target_lang: &str,
    handle: &JobHandle,
    translator: &dyn Translator,
) -> Result<(), JobError> {
    let blocks = match extract_blocks(doc, page_num, page_id) {
        Ok(blocks) => blocks,
        Err(e @ CoreError::PageStructure { .. }) => {
            handle.warn(&format!("skipped: {}", e));
            return Ok(());
        }
        Err(other) => return Err(other.into()),
    };

    if !overlapping_pairs(&blocks).is_empty() {
        handle.warn(&format!(
            "page {}: overlapping text regions, applying in block order",
            page_num
        ));
    }

    debug!(page_num, blocks = blocks.len(), "rewriting page");

    for block in &blocks {
        let translated = match translator.translate(&block.text, source_lang, target_lang) {
            Ok(text) => text,
            Err(e) => {
                // Keep the original text for this block and move on.
                handle.warn(&e.to_string());
                block.text.clone()
            }
        };

        let plan = fit(&translated, &block.bbox, block.font_size);
        if plan.truncated {
            debug!(page_num, "translated text truncated to fit its region");
        }

        rewrite::apply(doc, page_id, block, &plan)?;
    }

    Ok(())
}
