//! Language detection and language-specific cleaning as one capability, so
//! the language picked for a document is always the one whose resources
//! clean it.

use std::collections::HashMap;
use std::path::Path;

use reviewdb_core::Language;

use crate::lexicon::Lexicon;

/// Texts with fewer alphabetic characters than this go to the fallback language.
const MIN_DETECTABLE_ALPHA_CHARS: usize = 3;

/// Detects the language of a review and reduces it to space-separated lemmas.
#[derive(Debug, Clone)]
pub struct LocalizedCleaner {
    lexicons: HashMap<Language, Lexicon>,
    fallback: Language,
}

impl LocalizedCleaner {
    /// Load every supported language's lexicon, degrading any that fail.
    ///
    /// A lexicon that cannot be loaded, or whose override file declares
    /// another language, is replaced by [`Lexicon::empty`] for the rest of
    /// the process, and a single warning is logged for it.
    #[must_use]
    pub fn initialize(lexicon_dir: Option<&Path>, fallback: Language) -> Self {
        let lexicons = Language::ALL
            .into_iter()
            .map(|lang| match Lexicon::load(lang, lexicon_dir) {
                Ok(lexicon) => {
                    tracing::debug!(language = %lang, "lexicon loaded");
                    lexicon
                }
                Err(e) => {
                    tracing::warn!(
                        language = %lang,
                        error = %e,
                        "lexicon unavailable; cleaning for this language is normalization-only"
                    );
                    Lexicon::empty(lang)
                }
            })
            .collect();
        Self::from_lexicons(lexicons, fallback)
    }

    /// Build from already-loaded lexicons. Missing languages get an empty one.
    #[must_use]
    pub fn from_lexicons(lexicons: Vec<Lexicon>, fallback: Language) -> Self {
        let mut by_language: HashMap<Language, Lexicon> = lexicons
            .into_iter()
            .map(|lexicon| (lexicon.language(), lexicon))
            .collect();
        for lang in Language::ALL {
            by_language
                .entry(lang)
                .or_insert_with(|| Lexicon::empty(lang));
        }
        Self {
            lexicons: by_language,
            fallback,
        }
    }

    #[must_use]
    pub fn fallback(&self) -> Language {
        self.fallback
    }

    /// Best-effort language detection.
    ///
    /// Each language scores one point per stopword token and per marker
    /// occurrence. Very short texts, texts with no evidence, and ties that
    /// include the fallback all resolve to the fallback language.
    #[must_use]
    pub fn detect(&self, text: &str) -> Language {
        let lowered = text.to_lowercase();
        let alpha = lowered.chars().filter(|c| c.is_alphabetic()).count();
        if alpha < MIN_DETECTABLE_ALPHA_CHARS {
            return self.fallback;
        }

        let tokens: Vec<&str> = tokenize(&lowered).collect();
        let mut best = self.fallback;
        let mut best_score = self.score(self.fallback, &lowered, &tokens);
        for lang in Language::ALL {
            let score = self.score(lang, &lowered, &tokens);
            if score > best_score {
                best = lang;
                best_score = score;
            }
        }
        best
    }

    fn score(&self, lang: Language, lowered: &str, tokens: &[&str]) -> usize {
        let lexicon = self.lexicon(lang);
        let stopword_hits = tokens.iter().filter(|t| lexicon.is_stopword(t)).count();
        stopword_hits + lexicon.marker_hits(lowered)
    }

    /// Reduce `text` to space-separated lemmas using `lang`'s resources.
    ///
    /// Lowercases, splits on anything that is not alphanumeric (apostrophes
    /// included), drops stopwords, single characters and tokens containing
    /// digits, then lemmatizes what remains.
    #[must_use]
    pub fn clean(&self, text: &str, lang: Language) -> String {
        let lexicon = self.lexicon(lang);
        let lowered = text.to_lowercase();
        tokenize(&lowered)
            .filter(|t| t.chars().count() > 1)
            .filter(|t| t.chars().all(char::is_alphabetic))
            .filter(|t| !lexicon.is_stopword(t))
            .map(|t| lexicon.lemmatize(t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Detect, then clean with the detected language's resources.
    #[must_use]
    pub fn process(&self, text: &str) -> (Language, String) {
        let lang = self.detect(text);
        (lang, self.clean(text, lang))
    }

    fn lexicon(&self, lang: Language) -> &Lexicon {
        // from_lexicons guarantees an entry for every supported language.
        &self.lexicons[&lang]
    }
}

fn tokenize(lowered: &str) -> impl Iterator<Item = &str> {
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> LocalizedCleaner {
        LocalizedCleaner::initialize(None, Language::French)
    }

    #[test]
    fn override_for_the_wrong_language_degrades_only_that_language() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("en.yaml"),
            "language: fr\nstopwords: [widget]\n",
        )
        .unwrap();
        let c = LocalizedCleaner::initialize(Some(dir.path()), Language::French);

        // English is normalization-only; French keeps its embedded lexicon.
        assert_eq!(c.clean("The widget", Language::English), "the widget");
        assert_eq!(c.clean("Le widget", Language::French), "widget");
    }

    #[test]
    fn detects_french() {
        let c = cleaner();
        assert_eq!(
            c.detect("Les clients n'ont pas aimé les produits livrés hier !"),
            Language::French
        );
    }

    #[test]
    fn detects_english() {
        let c = cleaner();
        assert_eq!(
            c.detect("I absolutely love this! Best purchase ever, and it was cheap."),
            Language::English
        );
    }

    #[test]
    fn short_text_uses_fallback() {
        let c = LocalizedCleaner::initialize(None, Language::English);
        assert_eq!(c.detect("ok"), Language::English);
        assert_eq!(c.detect("   "), Language::English);
        assert_eq!(c.detect("42!"), Language::English);
    }

    #[test]
    fn no_evidence_uses_fallback() {
        let c = cleaner();
        assert_eq!(c.detect("livraison rapide"), Language::French);
        let c = LocalizedCleaner::initialize(None, Language::English);
        assert_eq!(c.detect("livraison rapide"), Language::English);
    }

    #[test]
    fn clean_french_sentence() {
        let c = cleaner();
        assert_eq!(
            c.clean("Les clients n'ont pas aimé les produits livrés hier !", Language::French),
            "client aimer produit livrer hier"
        );
    }

    #[test]
    fn clean_splits_elisions() {
        let c = cleaner();
        assert_eq!(c.clean("j'aime ce produit", Language::French), "aimer produit");
        assert_eq!(
            c.clean("produit nul je deteste", Language::French),
            "produit nul détester"
        );
    }

    #[test]
    fn clean_drops_numbers_and_punctuation() {
        let c = cleaner();
        assert_eq!(
            c.clean("Reçu en 48h... 5/5 !!!", Language::French),
            "recevoir"
        );
    }

    #[test]
    fn clean_english_sentence() {
        let c = cleaner();
        assert_eq!(
            c.clean("I loved the batteries, they really work", Language::English),
            "love battery work"
        );
    }

    #[test]
    fn clean_empty_text_is_empty() {
        let c = cleaner();
        assert_eq!(c.clean("", Language::French), "");
        assert_eq!(c.clean("  \t ", Language::English), "");
    }

    #[test]
    fn degraded_language_only_normalizes() {
        let c = LocalizedCleaner::from_lexicons(Vec::new(), Language::French);
        assert_eq!(c.clean("Le Produit, TRÈS bien!", Language::French), "le produit très bien");
    }

    #[test]
    fn process_pairs_detection_with_cleaning() {
        let c = cleaner();
        let (lang, cleaned) = c.process("The delivery was fast and the box arrived intact");
        assert_eq!(lang, Language::English);
        assert_eq!(cleaned, "delivery fast box arrive intact");
    }
}
