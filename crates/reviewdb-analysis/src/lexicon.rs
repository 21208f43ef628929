//! Per-language cleaning resources: stopwords, lemma table, suffix rules and
//! the detection markers used to tell languages apart.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use reviewdb_core::Language;
use serde::Deserialize;

use crate::error::LexiconError;

const EMBEDDED_FR: &str = include_str!("../resources/fr.yaml");
const EMBEDDED_EN: &str = include_str!("../resources/en.yaml");

/// Rewrites a token ending in `suffix` when at least `min_stem` characters
/// precede it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuffixRule {
    pub suffix: String,
    #[serde(default)]
    pub replacement: String,
    #[serde(default = "default_min_stem")]
    pub min_stem: usize,
}

fn default_min_stem() -> usize {
    2
}

impl SuffixRule {
    fn apply(&self, token: &str) -> Option<String> {
        let stem = token.strip_suffix(self.suffix.as_str())?;
        (stem.chars().count() >= self.min_stem).then(|| format!("{stem}{}", self.replacement))
    }
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    language: Language,
    #[serde(default)]
    markers: Vec<String>,
    #[serde(default)]
    stopwords: Vec<String>,
    #[serde(default)]
    lemmas: HashMap<String, String>,
    #[serde(default)]
    suffix_rules: Vec<SuffixRule>,
}

/// Cleaning resources for one language. Read-only once built.
#[derive(Debug, Clone)]
pub struct Lexicon {
    language: Language,
    markers: Vec<String>,
    stopwords: HashSet<String>,
    lemmas: HashMap<String, String>,
    suffix_rules: Vec<SuffixRule>,
}

impl Lexicon {
    /// A lexicon with no resources. Cleaning with it only normalizes.
    #[must_use]
    pub fn empty(language: Language) -> Self {
        Self {
            language,
            markers: Vec::new(),
            stopwords: HashSet::new(),
            lemmas: HashMap::new(),
            suffix_rules: Vec::new(),
        }
    }

    /// Parse a YAML lexicon document.
    ///
    /// `origin` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError::Parse`] if the document is not a valid lexicon.
    pub fn from_yaml(yaml: &str, origin: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = serde_yaml::from_str(yaml).map_err(|e| LexiconError::Parse {
            path: origin.to_string(),
            source: e,
        })?;
        Ok(Self {
            language: file.language,
            markers: file.markers.into_iter().map(|m| m.to_lowercase()).collect(),
            stopwords: file.stopwords.into_iter().map(|w| w.to_lowercase()).collect(),
            lemmas: file
                .lemmas
                .into_iter()
                .map(|(form, lemma)| (form.to_lowercase(), lemma))
                .collect(),
            suffix_rules: file.suffix_rules,
        })
    }

    /// Read a YAML lexicon from disk.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError::Io`] if the file cannot be read, or
    /// [`LexiconError::Parse`] if it is malformed.
    pub fn from_path(path: &Path) -> Result<Self, LexiconError> {
        let content = std::fs::read_to_string(path).map_err(|e| LexiconError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content, &path.display().to_string())
    }

    /// The lexicon compiled into the binary for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError::Parse`] if the embedded resource is malformed.
    pub fn embedded(language: Language) -> Result<Self, LexiconError> {
        let yaml = match language {
            Language::French => EMBEDDED_FR,
            Language::English => EMBEDDED_EN,
        };
        Self::from_yaml(yaml, &format!("embedded:{}", language.code()))
    }

    /// Load `language`'s lexicon, preferring `<dir>/<code>.yaml` when it exists.
    ///
    /// # Errors
    ///
    /// Returns [`LexiconError`] if the chosen source cannot be read or parsed,
    /// or [`LexiconError::LanguageMismatch`] if an override file declares a
    /// different language than its file name.
    pub fn load(language: Language, dir: Option<&Path>) -> Result<Self, LexiconError> {
        if let Some(dir) = dir {
            let path = dir.join(format!("{}.yaml", language.code()));
            if path.is_file() {
                let lexicon = Self::from_path(&path)?;
                if lexicon.language != language {
                    return Err(LexiconError::LanguageMismatch {
                        path: path.display().to_string(),
                        expected: language,
                        found: lexicon.language,
                    });
                }
                return Ok(lexicon);
            }
        }
        Self::embedded(language)
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Number of detection markers found in already-lowercased `text`.
    #[must_use]
    pub fn marker_hits(&self, text: &str) -> usize {
        self.markers.iter().map(|m| text.matches(m.as_str()).count()).sum()
    }

    /// Base form of a lowercased token: lemma table first, then the first
    /// matching suffix rule, else the token itself.
    #[must_use]
    pub fn lemmatize(&self, token: &str) -> String {
        if let Some(lemma) = self.lemmas.get(token) {
            return lemma.clone();
        }
        self.suffix_rules
            .iter()
            .find_map(|rule| rule.apply(token))
            .unwrap_or_else(|| token.to_string())
    }
}
