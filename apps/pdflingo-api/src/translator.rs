//! Built-in translation engine.
//!
//! A deterministic word-substitution engine covering a small set of
//! language pairs. Deployments with a real machine-translation backend
//! swap this out behind the `Translator` trait; everything else in the
//! pipeline is engine-agnostic.

use pdflingo_core::{TranslationError, Translator};

/// Word-level glossary translator.
///
/// Words found in the glossary are substituted, everything else passes
/// through unchanged. Uncovered language pairs are rejected with
/// `UnsupportedPair`, which the job runner records as a warning while
/// keeping the original text.
pub struct GlossaryTranslator;

const EN_ES: &[(&str, &str)] = &[
    ("the", "el"),
    ("a", "un"),
    ("and", "y"),
    ("or", "o"),
    ("of", "de"),
    ("in", "en"),
    ("for", "para"),
    ("with", "con"),
    ("hello", "hola"),
    ("world", "mundo"),
    ("page", "pagina"),
    ("document", "documento"),
    ("translation", "traduccion"),
    ("report", "informe"),
    ("summary", "resumen"),
    ("introduction", "introduccion"),
    ("conclusion", "conclusion"),
    ("table", "tabla"),
    ("figure", "figura"),
    ("chapter", "capitulo"),
];

const EN_FR: &[(&str, &str)] = &[
    ("the", "le"),
    ("a", "un"),
    ("and", "et"),
    ("or", "ou"),
    ("of", "de"),
    ("in", "dans"),
    ("for", "pour"),
    ("with", "avec"),
    ("hello", "bonjour"),
    ("world", "monde"),
    ("page", "page"),
    ("document", "document"),
    ("translation", "traduction"),
    ("report", "rapport"),
    ("summary", "resume"),
    ("introduction", "introduction"),
    ("conclusion", "conclusion"),
    ("table", "tableau"),
    ("figure", "figure"),
    ("chapter", "chapitre"),
];

fn glossary(source_lang: &str, target_lang: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match (source_lang, target_lang) {
        ("en", "es") => Some(EN_ES),
        ("en", "fr") => Some(EN_FR),
        _ => None,
    }
}

fn translate_word(word: &str, glossary: &[(&str, &str)]) -> String {
    let lower = word.to_lowercase();
    match glossary.iter().find(|(from, _)| *from == lower) {
        Some((_, to)) => {
            // Carry over leading capitalization.
            if word.chars().next().is_some_and(|c| c.is_uppercase()) {
                let mut chars = to.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            } else {
                (*to).to_string()
            }
        }
        None => word.to_string(),
    }
}

impl Translator for GlossaryTranslator {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        if source_lang == target_lang {
            return Ok(text.to_string());
        }
        let glossary = glossary(source_lang, target_lang).ok_or_else(|| {
            TranslationError::UnsupportedPair {
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
            }
        })?;

        Ok(text
            .split(' ')
            .map(|word| translate_word(word, glossary))
            .collect::<Vec<_>>()
            .join(" "))
    }
}
