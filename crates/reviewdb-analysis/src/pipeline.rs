//! Batch orchestration: detect, clean, score, then model topics over the
//! whole cleaned corpus.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reviewdb_core::AppConfig;

use crate::cleaner::LocalizedCleaner;
use crate::error::AnalysisError;
use crate::sentiment::SentimentAdapter;
use crate::topic::{TopicModel, TopicModelConfig};
use crate::types::{AnalyzedBatch, Batch, Document, SentimentLabel};

/// Default number of in-flight classifier calls.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Runs one uploaded batch through every analysis stage.
///
/// The cleaner and the sentiment adapter are shared, read-only resources.
/// A fresh topic model is fitted for each batch.
#[derive(Debug, Clone)]
pub struct Pipeline {
    cleaner: Arc<LocalizedCleaner>,
    sentiment: Arc<SentimentAdapter>,
    topics: TopicModelConfig,
    concurrency: usize,
}

impl Pipeline {
    #[must_use]
    pub fn new(cleaner: Arc<LocalizedCleaner>, sentiment: Arc<SentimentAdapter>) -> Self {
        Self {
            cleaner,
            sentiment,
            topics: TopicModelConfig::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Build the shared resources from application config.
    ///
    /// Resource failures degrade rather than error; see
    /// [`LocalizedCleaner::initialize`] and [`SentimentAdapter::initialize`].
    pub async fn from_config(config: &AppConfig) -> Self {
        let cleaner = LocalizedCleaner::initialize(
            config.lexicon_dir.as_deref(),
            config.fallback_language,
        );
        let sentiment = SentimentAdapter::initialize(
            config.classifier_url.as_deref(),
            std::time::Duration::from_millis(config.classifier_timeout_ms),
        )
        .await;
        Self::new(Arc::new(cleaner), Arc::new(sentiment))
            .with_topic_config(TopicModelConfig {
                n_topics: config.topic_count,
                n_keywords: config.topic_keywords,
                seed: config.topic_seed,
                max_iter: config.topic_max_iter,
            })
            .with_concurrency(config.sentiment_concurrency)
    }

    #[must_use]
    pub fn with_topic_config(mut self, topics: TopicModelConfig) -> Self {
        self.topics = topics;
        self
    }

    /// Override the topic count only.
    #[must_use]
    pub fn with_topic_count(mut self, n_topics: usize) -> Self {
        self.topics.n_topics = n_topics;
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn topic_config(&self) -> TopicModelConfig {
        self.topics
    }

    /// Analyze every row of `batch`, reading text from `text_column`.
    ///
    /// The returned documents match the batch rows one to one, in order.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MissingColumn`] if `text_column` is absent,
    /// [`AnalysisError::InvalidConfiguration`] if the topic count is zero or
    /// exceeds the vocabulary (checked before any classifier call), or
    /// [`AnalysisError::TopicTask`] if the topic fit could not complete.
    pub async fn analyze(
        &self,
        batch: Batch,
        text_column: &str,
    ) -> Result<AnalyzedBatch, AnalysisError> {
        let raw_texts: Vec<String> = batch
            .column(text_column)?
            .into_iter()
            .map(str::to_string)
            .collect();

        tracing::info!(
            rows = raw_texts.len(),
            column = text_column,
            "analyzing batch"
        );

        // Stages 1 and 2.
        let prepared: Vec<_> = raw_texts
            .iter()
            .map(|text| self.cleaner.process(text))
            .collect();

        // Topic feasibility depends only on stage 2, so check it before any
        // classifier calls.
        let corpus: Vec<&str> = prepared.iter().map(|(_, c)| c.as_str()).collect();
        let prepared_corpus = TopicModel::new(self.topics).prepare(&corpus)?;

        // Stage 3.
        let sentiments: Vec<_> = stream::iter(prepared.iter())
            .map(|(_, cleaned)| self.sentiment.analyze(cleaned))
            .buffered(self.concurrency)
            .collect()
            .await;

        // Stage 4.
        let topic_output = tokio::task::spawn_blocking(move || prepared_corpus.fit())
            .await
            .map_err(|e| AnalysisError::TopicTask(e.to_string()))??;

        let documents: Vec<Document> = raw_texts
            .into_iter()
            .zip(prepared)
            .zip(sentiments)
            .enumerate()
            .map(|(idx, ((raw_text, (language, cleaned_text)), sentiment))| {
                if sentiment.label == SentimentLabel::Error {
                    tracing::debug!(row = idx, "sentiment defaulted to Error");
                }
                Document {
                    raw_text,
                    language,
                    cleaned_text,
                    sentiment,
                    topic: topic_output.label_for(idx),
                }
            })
            .collect();

        let analyzed = AnalyzedBatch {
            batch,
            text_column: text_column.to_string(),
            documents,
            topics: topic_output.topics,
        };

        let errors = analyzed
            .sentiment_counts()
            .get(&SentimentLabel::Error)
            .copied()
            .unwrap_or(0);
        tracing::info!(
            documents = analyzed.documents.len(),
            errors,
            topics = analyzed.topics.len(),
            "batch analysis complete"
        );

        Ok(analyzed)
    }
}
