//! Corpus-level topic modeling: vectorize, fit, assign, summarize.

use crate::error::AnalysisError;
use crate::lda::LatentDirichletAllocation;
use crate::types::Topic;
use crate::vectorize::{CountVectorizer, DocumentTermMatrix};

/// Settings for one topic-model run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicModelConfig {
    /// Number of topics to fit (K).
    pub n_topics: usize,
    /// Keywords kept per topic (M).
    pub n_keywords: usize,
    pub seed: u64,
    pub max_iter: usize,
}

impl Default for TopicModelConfig {
    fn default() -> Self {
        Self {
            n_topics: 2,
            n_keywords: 10,
            seed: 42,
            max_iter: 10,
        }
    }
}

/// Per-document dominant topics plus the topic summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicModelOutput {
    /// Dominant topic id per input document; all `None` when skipped.
    pub assignments: Vec<Option<usize>>,
    pub topics: Vec<Topic>,
}

impl TopicModelOutput {
    /// Result for a corpus that could not be modeled.
    #[must_use]
    pub fn skipped(n_docs: usize) -> Self {
        Self {
            assignments: vec![None; n_docs],
            topics: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.topics.is_empty()
    }

    /// Display label of document `idx`'s dominant topic.
    #[must_use]
    pub fn label_for(&self, idx: usize) -> Option<String> {
        self.assignments
            .get(idx)
            .copied()
            .flatten()
            .map(Topic::label_for)
    }
}

/// Fits a fresh LDA model per call; nothing carries over between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopicModel {
    config: TopicModelConfig,
}

impl TopicModel {
    #[must_use]
    pub fn new(config: TopicModelConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> TopicModelConfig {
        self.config
    }

    /// Vectorize `documents` and check the topic count against the vocabulary.
    ///
    /// `documents` are cleaned texts (space-separated lemmas). Nothing is
    /// fitted yet, so callers can reject an infeasible configuration before
    /// doing any other per-batch work.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] when the topic count is
    /// zero or larger than a non-empty vocabulary.
    pub fn prepare<S: AsRef<str>>(
        &self,
        documents: &[S],
    ) -> Result<PreparedCorpus, AnalysisError> {
        if self.config.n_topics == 0 {
            return Err(AnalysisError::InvalidConfiguration(
                "topic count must be at least 1".to_string(),
            ));
        }

        let dtm = CountVectorizer::new().fit_transform(documents);
        if !dtm.is_degenerate() && self.config.n_topics > dtm.n_terms() {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "topic count {} exceeds vocabulary size {}",
                self.config.n_topics,
                dtm.n_terms()
            )));
        }

        Ok(PreparedCorpus {
            config: self.config,
            dtm,
        })
    }

    /// Assign every document a dominant topic and extract topic keywords.
    ///
    /// Shorthand for [`TopicModel::prepare`] followed by
    /// [`PreparedCorpus::fit`].
    ///
    /// # Errors
    ///
    /// Same as [`TopicModel::prepare`].
    pub fn run<S: AsRef<str>>(
        &self,
        documents: &[S],
    ) -> Result<TopicModelOutput, AnalysisError> {
        self.prepare(documents)?.fit()
    }
}

/// A vectorized corpus whose topic count is known to be feasible.
#[derive(Debug, Clone)]
pub struct PreparedCorpus {
    config: TopicModelConfig,
    dtm: DocumentTermMatrix,
}

impl PreparedCorpus {
    #[must_use]
    pub fn n_docs(&self) -> usize {
        self.dtm.n_docs()
    }

    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.dtm.n_terms()
    }

    /// Fit LDA and summarize it. An empty corpus or an empty vocabulary
    /// yields [`TopicModelOutput::skipped`].
    ///
    /// # Errors
    ///
    /// Propagates [`AnalysisError`] from the underlying model.
    pub fn fit(self) -> Result<TopicModelOutput, AnalysisError> {
        let dtm = self.dtm;
        if dtm.is_degenerate() {
            tracing::info!(
                documents = dtm.n_docs(),
                "empty vocabulary after vectorization; skipping topic modeling"
            );
            return Ok(TopicModelOutput::skipped(dtm.n_docs()));
        }

        let mut lda = LatentDirichletAllocation::new(self.config.n_topics)
            .with_random_seed(self.config.seed)
            .with_max_iter(self.config.max_iter);
        lda.fit(&dtm)?;

        let assignments = lda
            .dominant_topics(&dtm)?
            .into_iter()
            .map(Some)
            .collect();

        let topics = lda
            .top_terms(dtm.vocabulary(), self.config.n_keywords)?
            .into_iter()
            .enumerate()
            .map(|(id, terms)| Topic {
                id,
                label: Topic::label_for(id),
                keywords: terms.into_iter().map(|(term, _)| term).collect(),
            })
            .collect();

        tracing::debug!(
            documents = dtm.n_docs(),
            vocabulary = dtm.n_terms(),
            topics = self.config.n_topics,
            "topic model fitted"
        );

        Ok(TopicModelOutput {
            assignments,
            topics,
        })
    }
}
