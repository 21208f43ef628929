//! Latent Dirichlet Allocation fitted with batch variational Bayes.
//!
//! Each outer iteration runs a full E-step over the corpus (per-document
//! variational updates of the topic mixture `gamma`) followed by an M-step
//! that rebuilds the topic-word parameters `lambda` from the accumulated
//! sufficient statistics. Both priors default to `1 / n_topics`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::AnalysisError;
use crate::vectorize::DocumentTermMatrix;

/// Per-document updates stop once the mean absolute change drops below this.
const MEAN_CHANGE_TOL: f64 = 1e-3;
/// Upper bound on per-document updates within one E-step.
const MAX_DOC_UPDATE_ITER: usize = 100;
/// Keeps the normalizer strictly positive.
const NORM_EPS: f64 = f64::EPSILON;

/// LDA topic model over a [`DocumentTermMatrix`].
///
/// `fit` takes `&mut self`: a model is never shared across an in-flight fit.
#[derive(Debug, Clone)]
pub struct LatentDirichletAllocation {
    n_topics: usize,
    max_iter: usize,
    random_seed: u64,
    /// Topic-word variational parameters (`n_topics` rows × `n_terms`).
    components: Option<Vec<Vec<f64>>>,
}

impl LatentDirichletAllocation {
    #[must_use]
    pub fn new(n_topics: usize) -> Self {
        Self {
            n_topics,
            max_iter: 10,
            random_seed: 42,
            components: None,
        }
    }

    #[must_use]
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    #[must_use]
    pub fn n_topics(&self) -> usize {
        self.n_topics
    }

    #[allow(clippy::cast_precision_loss)]
    fn prior(&self) -> f64 {
        1.0 / self.n_topics as f64
    }

    /// Fit the model. Refitting discards any previous state.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] if `n_topics` is zero,
    /// the matrix is degenerate, or `n_topics` exceeds the vocabulary size.
    pub fn fit(&mut self, dtm: &DocumentTermMatrix) -> Result<(), AnalysisError> {
        self.validate(dtm)?;

        let n_terms = dtm.n_terms();
        let prior = self.prior();
        let mut rng = StdRng::seed_from_u64(self.random_seed);
        let mut lambda: Vec<Vec<f64>> = (0..self.n_topics)
            .map(|_| (0..n_terms).map(|_| rng.random_range(0.9..1.1)).collect())
            .collect();

        for _ in 0..self.max_iter {
            let exp_topic_word = exp_dirichlet_expectation_rows(&lambda);
            let (_, suff_stats) = self.e_step(dtm, &exp_topic_word, true);
            // M-step: lambda = eta + sstats * exp(E[log beta]).
            for (k, row) in lambda.iter_mut().enumerate() {
                for (v, value) in row.iter_mut().enumerate() {
                    *value = prior + suff_stats[k][v] * exp_topic_word[k][v];
                }
            }
        }

        self.components = Some(lambda);
        Ok(())
    }

    fn validate(&self, dtm: &DocumentTermMatrix) -> Result<(), AnalysisError> {
        if self.n_topics == 0 {
            return Err(AnalysisError::InvalidConfiguration(
                "topic count must be at least 1".to_string(),
            ));
        }
        if dtm.is_degenerate() {
            return Err(AnalysisError::InvalidConfiguration(
                "cannot fit a topic model on an empty vocabulary".to_string(),
            ));
        }
        if self.n_topics > dtm.n_terms() {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "topic count {} exceeds vocabulary size {}",
                self.n_topics,
                dtm.n_terms()
            )));
        }
        Ok(())
    }

    /// Topic-word weights of the fitted model, one row per topic.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] if the model is not fitted.
    pub fn components(&self) -> Result<&[Vec<f64>], AnalysisError> {
        self.components.as_deref().ok_or_else(|| {
            AnalysisError::InvalidConfiguration("topic model is not fitted".to_string())
        })
    }

    /// Normalized topic-membership distribution for every document.
    ///
    /// Documents without any in-vocabulary term get the uniform distribution.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] if the model is not
    /// fitted or `dtm` was built over a different vocabulary size.
    pub fn transform(&self, dtm: &DocumentTermMatrix) -> Result<Vec<Vec<f64>>, AnalysisError> {
        let components = self.components()?;
        if components.first().map_or(0, Vec::len) != dtm.n_terms() {
            return Err(AnalysisError::InvalidConfiguration(format!(
                "matrix has {} terms but the model was fitted on {}",
                dtm.n_terms(),
                components.first().map_or(0, Vec::len)
            )));
        }
        let exp_topic_word = exp_dirichlet_expectation_rows(components);
        let (gamma, _) = self.e_step(dtm, &exp_topic_word, false);
        Ok(gamma
            .into_iter()
            .map(|mut row| {
                let total: f64 = row.iter().sum();
                if total > 0.0 {
                    for value in &mut row {
                        *value /= total;
                    }
                }
                row
            })
            .collect())
    }

    /// Index of the most probable topic per document; ties go to the lowest index.
    ///
    /// # Errors
    ///
    /// See [`transform`](Self::transform).
    pub fn dominant_topics(&self, dtm: &DocumentTermMatrix) -> Result<Vec<usize>, AnalysisError> {
        Ok(self.transform(dtm)?.iter().map(|row| argmax(row)).collect())
    }

    /// The `n_words` heaviest terms of every topic, heaviest first.
    ///
    /// Equal weights keep vocabulary order.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfiguration`] if the model is not
    /// fitted or `vocabulary` does not match the fitted term count.
    pub fn top_terms(
        &self,
        vocabulary: &[String],
        n_words: usize,
    ) -> Result<Vec<Vec<(String, f64)>>, AnalysisError> {
        let components = self.components()?;
        if components.first().map_or(0, Vec::len) != vocabulary.len() {
            return Err(AnalysisError::InvalidConfiguration(
                "vocabulary size must match the fitted term count".to_string(),
            ));
        }

        Ok(components
            .iter()
            .map(|weights| {
                let mut ranked: Vec<(usize, f64)> = weights.iter().copied().enumerate().collect();
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                ranked
                    .into_iter()
                    .take(n_words)
                    .map(|(idx, weight)| (vocabulary[idx].clone(), weight))
                    .collect()
            })
            .collect())
    }

    /// One pass of per-document variational updates.
    ///
    /// Returns the unnormalized `gamma` for every document and, when
    /// `collect_stats` is set, the sufficient statistics for the M-step.
    fn e_step(
        &self,
        dtm: &DocumentTermMatrix,
        exp_topic_word: &[Vec<f64>],
        collect_stats: bool,
    ) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let k_topics = self.n_topics;
        let prior = self.prior();
        let mut suff_stats = if collect_stats {
            vec![vec![0.0; dtm.n_terms()]; k_topics]
        } else {
            Vec::new()
        };
        let mut gammas = Vec::with_capacity(dtm.n_docs());

        for row in dtm.rows() {
            let mut gamma = vec![1.0; k_topics];
            let mut exp_doc_topic = exp_dirichlet_expectation(&gamma);

            for _ in 0..MAX_DOC_UPDATE_ITER {
                let last = gamma.clone();
                let norm_phi = phi_normalizer(row, &exp_doc_topic, exp_topic_word);

                for k in 0..k_topics {
                    let weighted: f64 = row
                        .iter()
                        .zip(&norm_phi)
                        .map(|(&(term, count), norm)| count / norm * exp_topic_word[k][term])
                        .sum();
                    gamma[k] = exp_doc_topic[k] * weighted + prior;
                }
                exp_doc_topic = exp_dirichlet_expectation(&gamma);

                if mean_change(&last, &gamma) < MEAN_CHANGE_TOL {
                    break;
                }
            }

            if collect_stats {
                let norm_phi = phi_normalizer(row, &exp_doc_topic, exp_topic_word);
                for (k, stats) in suff_stats.iter_mut().enumerate() {
                    for (&(term, count), norm) in row.iter().zip(&norm_phi) {
                        stats[term] += exp_doc_topic[k] * count / norm;
                    }
                }
            }

            gammas.push(gamma);
        }

        (gammas, suff_stats)
    }
}

/// `sum_k exp(E[log theta_k]) * exp(E[log beta_kw]) + eps` for each term in `row`.
fn phi_normalizer(
    row: &[(usize, f64)],
    exp_doc_topic: &[f64],
    exp_topic_word: &[Vec<f64>],
) -> Vec<f64> {
    row.iter()
        .map(|&(term, _)| {
            exp_doc_topic
                .iter()
                .zip(exp_topic_word)
                .map(|(theta, beta)| theta * beta[term])
                .sum::<f64>()
                + NORM_EPS
        })
        .collect()
}

/// `exp(psi(x_i) - psi(sum x))` for a Dirichlet parameter vector.
fn exp_dirichlet_expectation(alpha: &[f64]) -> Vec<f64> {
    let psi_total = digamma(alpha.iter().sum());
    alpha
        .iter()
        .map(|&a| (digamma(a) - psi_total).exp())
        .collect()
}

fn exp_dirichlet_expectation_rows(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    rows.iter().map(|row| exp_dirichlet_expectation(row)).collect()
}

#[allow(clippy::cast_precision_loss)]
fn mean_change(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let total: f64 = a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum();
    total / a.len() as f64
}

/// First index holding the maximum value.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = idx;
        }
    }
    best
}

/// Digamma function for `x > 0`.
///
/// Shifts `x` above 6 with the recurrence `psi(x) = psi(x + 1) - 1/x`, then
/// applies the asymptotic expansion.
pub(crate) fn digamma(mut x: f64) -> f64 {
    let mut result = 0.0;
    while x < 6.0 {
        result -= 1.0 / x;
        x += 1.0;
    }
    let f = 1.0 / (x * x);
    let series = f
        * (1.0 / 12.0
            - f * (1.0 / 120.0 - f * (1.0 / 252.0 - f * (1.0 / 240.0 - f * (1.0 / 132.0)))));
    result + x.ln() - 0.5 / x - series
}
