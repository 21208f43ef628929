//! Bag-of-words count vectorization over whitespace-separated lemmas.

use std::collections::{BTreeMap, HashMap};

/// Sparse document-term count matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTermMatrix {
    vocabulary: Vec<String>,
    /// One row per document: `(term index, count)` sorted by term index.
    rows: Vec<Vec<(usize, f64)>>,
}

impl DocumentTermMatrix {
    /// Retained terms, sorted lexicographically. Column `i` is `vocabulary()[i]`.
    #[must_use]
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<(usize, f64)>] {
        &self.rows
    }

    #[must_use]
    pub fn n_docs(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn n_terms(&self) -> usize {
        self.vocabulary.len()
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.rows.is_empty() || self.vocabulary.is_empty()
    }

    /// Count of `term` in document `doc`, `0.0` when absent.
    #[must_use]
    pub fn count(&self, doc: usize, term: &str) -> f64 {
        let Ok(col) = self.vocabulary.binary_search_by(|t| t.as_str().cmp(term)) else {
            return 0.0;
        };
        self.rows
            .get(doc)
            .and_then(|row| row.iter().find(|(idx, _)| *idx == col))
            .map_or(0.0, |(_, count)| *count)
    }
}

/// Builds a [`DocumentTermMatrix`] with document-frequency filtering.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    min_df: usize,
    max_df: f64,
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CountVectorizer {
    /// Keep terms seen in at least 1 document and at most 95% of documents.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_df: 1,
            max_df: 0.95,
        }
    }

    /// Terms appearing in fewer than `min_df` documents are dropped.
    #[must_use]
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df.max(1);
        self
    }

    /// Terms appearing in more than this fraction of documents are dropped.
    #[must_use]
    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.max_df = max_df.clamp(0.0, 1.0);
        self
    }

    /// Largest document frequency a term may have and still be kept.
    ///
    /// `floor(max_df * n_docs)`, but never below 1 so that a lone document
    /// keeps its own terms.
    #[must_use]
    pub fn max_doc_count(&self, n_docs: usize) -> usize {
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let ceiling = (self.max_df * n_docs as f64).floor() as usize;
        ceiling.max(1)
    }

    /// Learn the vocabulary from `documents` and count it.
    #[must_use]
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> DocumentTermMatrix {
        let per_doc: Vec<HashMap<&str, f64>> = documents
            .iter()
            .map(|doc| {
                let mut counts: HashMap<&str, f64> = HashMap::new();
                for token in doc.as_ref().split_whitespace() {
                    *counts.entry(token).or_insert(0.0) += 1.0;
                }
                counts
            })
            .collect();

        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for counts in &per_doc {
            for term in counts.keys() {
                *doc_freq.entry(*term).or_insert(0) += 1;
            }
        }

        let max_doc_count = self.max_doc_count(documents.len());
        let vocabulary: Vec<String> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= self.min_df && *df <= max_doc_count)
            .map(|(term, _)| term.to_string())
            .collect();

        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();

        let rows = per_doc
            .iter()
            .map(|counts| {
                let mut row: Vec<(usize, f64)> = counts
                    .iter()
                    .filter_map(|(term, count)| index.get(term).map(|&i| (i, *count)))
                    .collect();
                row.sort_by_key(|(i, _)| *i);
                row
            })
            .collect();

        DocumentTermMatrix { vocabulary, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_repeated_terms() {
        let dtm = CountVectorizer::new().fit_transform(&["prix prix livraison", "qualite"]);
        assert_eq!(dtm.vocabulary(), &["livraison", "prix", "qualite"]);
        assert!((dtm.count(0, "prix") - 2.0).abs() < f64::EPSILON);
        assert!((dtm.count(0, "livraison") - 1.0).abs() < f64::EPSILON);
        assert!(dtm.count(1, "prix").abs() < f64::EPSILON);
    }

    #[test]
    fn drops_near_universal_terms() {
        let docs = ["produit bon", "produit nul", "produit rapide"];
        let dtm = CountVectorizer::new().fit_transform(&docs);
        assert!(!dtm.vocabulary().contains(&"produit".to_string()));
        assert_eq!(dtm.n_terms(), 3);
    }

    #[test]
    fn keeps_terms_under_the_ceiling() {
        // 2 of 3 documents is below floor(0.95 * 3) = 2, so it stays.
        let docs = ["aimer produit", "produit nul détester", "livraison rapide"];
        let dtm = CountVectorizer::new().fit_transform(&docs);
        assert!(dtm.vocabulary().contains(&"produit".to_string()));
        assert_eq!(dtm.n_terms(), 6);
    }

    #[test]
    fn single_document_keeps_its_terms() {
        let dtm = CountVectorizer::new().fit_transform(&["livraison rapide"]);
        assert_eq!(dtm.vocabulary(), &["livraison", "rapide"]);
        assert!(!dtm.is_degenerate());
    }

    #[test]
    fn empty_documents_give_degenerate_matrix() {
        let dtm = CountVectorizer::new().fit_transform(&["", "   "]);
        assert!(dtm.is_degenerate());
        assert_eq!(dtm.n_docs(), 2);
        assert!(dtm.rows().iter().all(Vec::is_empty));
    }

    #[test]
    fn empty_corpus_is_degenerate() {
        let docs: [&str; 0] = [];
        assert!(CountVectorizer::new().fit_transform(&docs).is_degenerate());
    }

    #[test]
    fn min_df_filters_rare_terms() {
        let docs = ["a b", "a c", "d e"];
        let dtm = CountVectorizer::new()
            .with_min_df(2)
            .with_max_df(1.0)
            .fit_transform(&docs);
        assert_eq!(dtm.vocabulary(), &["a"]);
    }

    #[test]
    fn max_doc_count_floor_and_minimum() {
        let v = CountVectorizer::new();
        assert_eq!(v.max_doc_count(1), 1);
        assert_eq!(v.max_doc_count(3), 2);
        assert_eq!(v.max_doc_count(20), 19);
        assert_eq!(v.max_doc_count(100), 95);
    }
}
