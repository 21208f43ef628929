//! Database operations for the `reviews` table.

use chrono::{DateTime, Utc};
use reviewdb_analysis::Document;
use sqlx::SqlitePool;

use crate::DbError;

/// Source tag stored when the upload carries no `source` column.
pub const DEFAULT_SOURCE: &str = "manual_upload";

const DEFAULT_LIST_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub source: String,
    pub text_content: String,
    pub language: Option<String>,
    pub topic: Option<String>,
    pub sentiment: Option<String>,
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Values for a review about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub source: String,
    pub text_content: String,
    pub language: Option<String>,
    pub topic: Option<String>,
    pub sentiment: Option<String>,
    pub score: Option<f64>,
}

impl NewReview {
    /// Map an analyzed document onto the stored shape.
    ///
    /// A blank `source` falls back to [`DEFAULT_SOURCE`].
    #[must_use]
    pub fn from_document(document: &Document, source: Option<&str>) -> Self {
        let source = source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SOURCE);
        Self {
            source: source.to_string(),
            text_content: document.raw_text.clone(),
            language: Some(document.language.code().to_string()),
            topic: document.topic.clone(),
            sentiment: Some(document.sentiment.label.to_string()),
            score: Some(f64::from(document.sentiment.confidence)),
        }
    }
}

/// Optional filters for [`list_reviews`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub topic: Option<String>,
    pub sentiment: Option<String>,
    pub source: Option<String>,
    /// Defaults to 50 when unset.
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert reviews and return how many were written.
///
/// All inserts run inside a single transaction; if any insert fails the
/// whole batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn insert_reviews(pool: &SqlitePool, reviews: &[NewReview]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for review in reviews {
        sqlx::query(
            "INSERT INTO reviews (source, text_content, language, topic, sentiment, score) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&review.source)
        .bind(&review.text_content)
        .bind(&review.language)
        .bind(&review.topic)
        .bind(&review.sentiment)
        .bind(review.score)
        .execute(&mut *tx)
        .await?;
        count += 1;
    }

    tx.commit().await?;
    tracing::debug!(count, "reviews inserted");
    Ok(count)
}

/// Fetch a single review by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no review has that id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_review(pool: &SqlitePool, id: i64) -> Result<ReviewRow, DbError> {
    sqlx::query_as::<_, ReviewRow>(
        "SELECT id, source, text_content, language, topic, sentiment, score, created_at \
         FROM reviews \
         WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// List stored reviews matching `filter`, newest first.
///
/// Results are ordered by `created_at DESC` then `id DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reviews(
    pool: &SqlitePool,
    filter: &ReviewFilter,
) -> Result<Vec<ReviewRow>, DbError> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        "SELECT id, source, text_content, language, topic, sentiment, score, created_at \
         FROM reviews \
         WHERE (?1 IS NULL OR topic = ?1) \
           AND (?2 IS NULL OR sentiment = ?2) \
           AND (?3 IS NULL OR source = ?3) \
         ORDER BY created_at DESC, id DESC \
         LIMIT ?4",
    )
    .bind(&filter.topic)
    .bind(&filter.sentiment)
    .bind(&filter.source)
    .bind(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count stored reviews per sentiment label, ordered by label.
///
/// Reviews saved without a sentiment are grouped under `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_reviews_by_sentiment(
    pool: &SqlitePool,
) -> Result<Vec<(Option<String>, i64)>, DbError> {
    let rows = sqlx::query_as::<_, (Option<String>, i64)>(
        "SELECT sentiment, COUNT(*) \
         FROM reviews \
         GROUP BY sentiment \
         ORDER BY sentiment",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
