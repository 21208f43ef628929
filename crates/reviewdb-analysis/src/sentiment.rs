//! Sentiment adapter: wraps a star-rating classifier and maps its output
//! onto the Positive / Neutral / Negative / Error vocabulary.
//!
//! The adapter is initialize-or-degrade. If no classifier can be reached at
//! startup it keeps answering with the neutral default instead of failing.

use std::sync::Arc;
use std::time::Duration;

use crate::classifier::{HttpClassifier, TextClassifier};
use crate::error::ClassifierError;
use crate::types::{SentimentLabel, SentimentResult, StarRating};

/// Characters (Unicode scalar values) passed to the classifier per document.
pub const MAX_INPUT_CHARS: usize = 512;

/// Default per-call budget when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Map a star rating onto a sentiment label.
///
/// 1-2 stars are negative, 3 is neutral, 4-5 are positive.
#[must_use]
pub fn rating_to_label(rating: StarRating) -> SentimentLabel {
    match rating.get() {
        1 | 2 => SentimentLabel::Negative,
        3 => SentimentLabel::Neutral,
        _ => SentimentLabel::Positive,
    }
}

/// First [`MAX_INPUT_CHARS`] characters of `text`, never splitting a character.
#[must_use]
pub fn truncate_chars(text: &str) -> &str {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Per-document sentiment classification.
#[derive(Clone)]
pub struct SentimentAdapter {
    classifier: Option<Arc<dyn TextClassifier>>,
    timeout: Duration,
}

impl std::fmt::Debug for SentimentAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentAdapter")
            .field("ready", &self.is_ready())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SentimentAdapter {
    /// Connect to the classifier at `url`, or degrade.
    ///
    /// With no URL, or when the readiness check fails, the adapter is built
    /// without a model and a single warning is logged. Never fails.
    pub async fn initialize(url: Option<&str>, timeout: Duration) -> Self {
        let Some(url) = url else {
            tracing::warn!("no sentiment classifier configured; all documents will be Neutral");
            return Self::degraded(timeout);
        };

        let classifier = HttpClassifier::new(url);
        match tokio::time::timeout(timeout, classifier.check_ready()).await {
            Ok(Ok(())) => {
                tracing::info!(url = %classifier.base_url(), "sentiment classifier ready");
                Self::with_classifier(Arc::new(classifier), timeout)
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    error = %e,
                    "sentiment classifier unavailable; all documents will be Neutral"
                );
                Self::degraded(timeout)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = duration_ms(timeout),
                    "sentiment classifier readiness check timed out; all documents will be Neutral"
                );
                Self::degraded(timeout)
            }
        }
    }

    #[must_use]
    pub fn with_classifier(classifier: Arc<dyn TextClassifier>, timeout: Duration) -> Self {
        Self {
            classifier: Some(classifier),
            timeout,
        }
    }

    /// An adapter with no model. Every call returns the neutral default.
    #[must_use]
    pub fn degraded(timeout: Duration) -> Self {
        Self {
            classifier: None,
            timeout,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.classifier.is_some()
    }

    /// Classify one document. Never fails.
    ///
    /// Blank text or a missing model yields [`SentimentResult::NEUTRAL_DEFAULT`];
    /// any classifier failure, including a timeout, yields
    /// [`SentimentResult::ERROR`].
    pub async fn analyze(&self, text: &str) -> SentimentResult {
        if text.trim().is_empty() {
            return SentimentResult::NEUTRAL_DEFAULT;
        }
        let Some(classifier) = &self.classifier else {
            return SentimentResult::NEUTRAL_DEFAULT;
        };

        match self.call(classifier.as_ref(), truncate_chars(text)).await {
            Ok((rating, confidence)) => SentimentResult::new(rating_to_label(rating), confidence),
            Err(e) => {
                tracing::warn!(error = %e, "sentiment classification failed");
                SentimentResult::ERROR
            }
        }
    }

    async fn call(
        &self,
        classifier: &dyn TextClassifier,
        text: &str,
    ) -> Result<(StarRating, f32), ClassifierError> {
        tokio::time::timeout(self.timeout, classifier.classify(text))
            .await
            .map_err(|_| ClassifierError::Timeout(duration_ms(self.timeout)))?
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
