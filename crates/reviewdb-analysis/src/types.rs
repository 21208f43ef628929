use std::collections::BTreeMap;

use reviewdb_core::Language;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Three-way sentiment plus a distinguishable failure marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Error,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 4] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
        SentimentLabel::Error,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Error => "Error",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SentimentLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sentiment label '{s}'"))
    }
}

/// Label and confidence produced for one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    /// Classifier confidence in `[0.0, 1.0]`; `0.0` for defaults and errors.
    pub confidence: f32,
}

impl SentimentResult {
    /// Default returned when there is nothing to classify or no model.
    pub const NEUTRAL_DEFAULT: SentimentResult = SentimentResult {
        label: SentimentLabel::Neutral,
        confidence: 0.0,
    };

    /// Returned when a classifier call fails.
    pub const ERROR: SentimentResult = SentimentResult {
        label: SentimentLabel::Error,
        confidence: 0.0,
    };

    /// Build a result, clamping `confidence` into `[0.0, 1.0]`.
    ///
    /// Non-finite confidences collapse to `0.0`.
    #[must_use]
    pub fn new(label: SentimentLabel, confidence: f32) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { label, confidence }
    }
}

/// Ordinal 1-5 star rating emitted by the pretrained classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StarRating(u8);

impl StarRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for StarRating {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(value)
        }
    }
}

/// One fitted topic with its highest-weight terms, heaviest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    /// Zero-based index into the fitted model.
    pub id: usize,
    /// Display label, `"Topic {id + 1}"`.
    pub label: String,
    pub keywords: Vec<String>,
}

impl Topic {
    #[must_use]
    pub fn label_for(id: usize) -> String {
        format!("Topic {}", id + 1)
    }

    /// Keywords rendered as a comma-separated line.
    #[must_use]
    pub fn keyword_line(&self) -> String {
        self.keywords.join(", ")
    }
}

/// One input row after every stage has run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub raw_text: String,
    pub language: Language,
    /// Space-separated lemmas; empty when cleaning produced nothing.
    pub cleaned_text: String,
    pub sentiment: SentimentResult,
    /// Dominant topic label; `None` when topic modeling was skipped.
    pub topic: Option<String>,
}

/// A tabular batch of string cells, as uploaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Batch {
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Build a single-column batch, mostly useful in tests.
    #[must_use]
    pub fn from_texts<S: AsRef<str>>(column: &str, texts: &[S]) -> Self {
        Self {
            headers: vec![column.to_string()],
            rows: texts.iter().map(|t| vec![t.as_ref().to_string()]).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value at (`row`, `column`); short rows read as empty.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", String::as_str)
    }

    /// All values of the named column, in row order.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MissingColumn`] if no header matches `name`.
    pub fn column(&self, name: &str) -> Result<Vec<&str>, AnalysisError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))?;
        Ok((0..self.rows.len()).map(|row| self.cell(row, idx)).collect())
    }
}

/// Output of one pipeline run: the untouched batch, one [`Document`] per
/// row in the same order, and the fitted topics.
#[derive(Debug, Clone)]
pub struct AnalyzedBatch {
    pub batch: Batch,
    pub text_column: String,
    pub documents: Vec<Document>,
    /// Empty when the corpus was degenerate.
    pub topics: Vec<Topic>,
}

impl AnalyzedBatch {
    /// Topic label to comma-joined keywords.
    #[must_use]
    pub fn topic_keywords(&self) -> BTreeMap<String, String> {
        self.topics
            .iter()
            .map(|t| (t.label.clone(), t.keyword_line()))
            .collect()
    }

    /// Number of documents carrying each sentiment label.
    #[must_use]
    pub fn sentiment_counts(&self) -> BTreeMap<SentimentLabel, usize> {
        let mut counts = BTreeMap::new();
        for doc in &self.documents {
            *counts.entry(doc.sentiment.label).or_insert(0) += 1;
        }
        counts
    }
}
