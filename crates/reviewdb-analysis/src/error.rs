use reviewdb_core::Language;
use thiserror::Error;

/// Batch-level failures returned by the analysis pipeline.
///
/// Per-document problems never surface here; they are replaced by defaults
/// inside the stage that hit them.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("text column '{0}' not found in batch")]
    MissingColumn(String),

    #[error("topic modeling task failed: {0}")]
    TopicTask(String),
}

/// Failures inside a [`TextClassifier`](crate::classifier::TextClassifier) call.
///
/// The sentiment adapter converts every variant into an `Error` label.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed classifier output: {0}")]
    MalformedResponse(String),

    #[error("classifier call exceeded {0} ms")]
    Timeout(u64),

    #[error("classifier unavailable: {0}")]
    Unavailable(String),
}

/// Failures loading a per-language lexicon.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lexicon {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("lexicon {path} declares language '{found}', expected '{expected}'")]
    LanguageMismatch {
        path: String,
        expected: Language,
        found: Language,
    },
}
