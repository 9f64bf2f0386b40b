//! Application state for the translation API

use std::sync::Arc;

use pdflingo_core::CachingTranslator;
use pdflingo_jobs::TranslationService;

use crate::translator::GlossaryTranslator;

pub struct AppState {
    pub service: TranslationService,
}

impl AppState {
    pub fn new() -> Self {
        // Repeated phrases across a document hit the engine once.
        let translator = Arc::new(CachingTranslator::new(GlossaryTranslator));
        Self {
            service: TranslationService::new(translator),
        }
    }
}
