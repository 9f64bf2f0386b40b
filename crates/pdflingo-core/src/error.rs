use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Page {page} cannot be read: {reason}")]
    PageStructure { page: u32, reason: String },

    #[error("Failed to rewrite page content: {0}")]
    Render(String),

    #[error("Failed to save PDF: {0}")]
    Save(String),
}

/// Failure raised by a translation engine for a single piece of text.
///
/// Callers are expected to treat these as recoverable: keep the original
/// text for the affected block and carry on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("Translation engine error: {0}")]
    Engine(String),

    #[error("Unsupported language pair: {source_lang} -> {target_lang}")]
    UnsupportedPair {
        source_lang: String,
        target_lang: String,
    },
}
