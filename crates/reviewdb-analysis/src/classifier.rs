//! Pretrained star-rating classifiers.
//!
//! [`TextClassifier`] is the seam the sentiment adapter calls through; the
//! HTTP implementation talks to a text-classification inference server that
//! exposes `GET /info` and `POST /predict`.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::types::StarRating;

/// Matches `"4 stars"`, `"1 star"`, `"5"`.
static STAR_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([0-9]+)\s*(?:stars?)?\s*$").expect("valid star label regex")
});

/// A model that rates text from 1 to 5 stars.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    /// Rate `text`, returning the predicted stars and the model's probability
    /// for that prediction.
    async fn classify(&self, text: &str) -> Result<(StarRating, f32), ClassifierError>;
}

/// One candidate label returned by the inference server.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a str,
}

/// Parse a `"N stars"` label into a rating.
///
/// # Errors
///
/// Returns [`ClassifierError::MalformedResponse`] if the label has no star
/// count or the count is outside 1 to 5.
pub fn parse_star_label(label: &str) -> Result<StarRating, ClassifierError> {
    let stars = STAR_LABEL
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .ok_or_else(|| {
            ClassifierError::MalformedResponse(format!("unrecognized label '{label}'"))
        })?;
    StarRating::try_from(stars)
        .map_err(|n| ClassifierError::MalformedResponse(format!("rating {n} outside 1-5")))
}

/// Pick the highest-scoring candidate. Earlier entries win ties.
///
/// # Errors
///
/// Returns [`ClassifierError::MalformedResponse`] for an empty candidate list
/// or an unparseable winning label.
pub fn best_prediction(candidates: &[LabelScore]) -> Result<(StarRating, f32), ClassifierError> {
    let best = candidates
        .iter()
        .fold(None::<&LabelScore>, |best, c| match best {
            Some(b) if b.score >= c.score => Some(b),
            _ => Some(c),
        })
        .ok_or_else(|| ClassifierError::MalformedResponse("empty prediction list".to_string()))?;
    if !best.score.is_finite() {
        return Err(ClassifierError::MalformedResponse(format!(
            "non-finite score for '{}'",
            best.label
        )));
    }
    Ok((parse_star_label(&best.label)?, best.score))
}

/// Classifier backed by a remote inference server.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClassifier {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Confirm the server is up and has a model loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifierError::Http`] if the server is unreachable, or
    /// [`ClassifierError::Unavailable`] if it answers with a non-success status.
    pub async fn check_ready(&self) -> Result<(), ClassifierError> {
        let response = self
            .client
            .get(format!("{}/info", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClassifierError::Unavailable(format!(
                "model info returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TextClassifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<(StarRating, f32), ClassifierError> {
        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(&PredictRequest { inputs: text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClassifierError::Status(response.status()));
        }

        let body = response.text().await?;
        let candidates: Vec<LabelScore> = serde_json::from_str(&body)
            .map_err(|e| ClassifierError::MalformedResponse(format!("invalid JSON: {e}")))?;
        best_prediction(&candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(label: &str, score: f32) -> LabelScore {
        LabelScore {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn parses_star_labels() {
        assert_eq!(parse_star_label("4 stars").unwrap().get(), 4);
        assert_eq!(parse_star_label("1 star").unwrap().get(), 1);
        assert_eq!(parse_star_label(" 5 Stars ").unwrap().get(), 5);
        assert_eq!(parse_star_label("3").unwrap().get(), 3);
    }

    #[test]
    fn rejects_out_of_range_and_garbage_labels() {
        assert!(matches!(
            parse_star_label("0 stars"),
            Err(ClassifierError::MalformedResponse(_))
        ));
        assert!(parse_star_label("6 stars").is_err());
        assert!(parse_star_label("POSITIVE").is_err());
        assert!(parse_star_label("").is_err());
    }

    #[test]
    fn best_prediction_takes_highest_score() {
        let candidates = [
            candidate("1 star", 0.05),
            candidate("5 stars", 0.71),
            candidate("4 stars", 0.20),
        ];
        let (rating, score) = best_prediction(&candidates).unwrap();
        assert_eq!(rating.get(), 5);
        assert!((score - 0.71).abs() < f32::EPSILON);
    }

    #[test]
    fn best_prediction_ties_keep_first() {
        let candidates = [candidate("2 stars", 0.5), candidate("4 stars", 0.5)];
        assert_eq!(best_prediction(&candidates).unwrap().0.get(), 2);
    }

    #[test]
    fn best_prediction_rejects_empty_list() {
        assert!(matches!(
            best_prediction(&[]),
            Err(ClassifierError::MalformedResponse(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        assert_eq!(
            HttpClassifier::new("http://localhost:8080/").base_url(),
            "http://localhost:8080"
        );
    }
}
