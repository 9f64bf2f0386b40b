//! Translation capability boundary.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::TranslationError;

/// Maximum number of memoized translations kept by [`CachingTranslator`].
const CACHE_CAPACITY: usize = 10_000;

/// A translation engine mapping text from a source to a target language.
///
/// Implementations may be slow and are called synchronously, many times per
/// page. Calls must be idempotent-safe: translating the same input twice has
/// no side effects beyond the translation itself.
pub trait Translator: Send + Sync {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError>;
}

/// Memoizing decorator over any [`Translator`].
///
/// Repeated phrases (running headers, footers, boilerplate) hit the
/// underlying engine once. The map is bounded; once full, new entries are
/// simply not cached.
pub struct CachingTranslator<T> {
    inner: T,
    cache: Mutex<HashMap<(String, String, String), String>>,
}

impl<T: Translator> CachingTranslator<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Translator> Translator for CachingTranslator<T> {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let key = (
            text.to_string(),
            source_lang.to_string(),
            target_lang.to_string(),
        );

        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return Ok(hit.clone());
            }
        }

        let translated = self.inner.translate(text, source_lang, target_lang)?;

        if let Ok(mut cache) = self.cache.lock() {
            if cache.len() < CACHE_CAPACITY {
                cache.insert(key, translated.clone());
            }
        }

        Ok(translated)
    }
}
