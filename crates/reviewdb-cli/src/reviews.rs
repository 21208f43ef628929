//! Read-only review browsing handlers.

use clap::Subcommand;
use reviewdb_analysis::SentimentLabel;
use reviewdb_db::ReviewFilter;

use crate::analyze::preview;

/// Sub-commands available under `reviews`.
#[derive(Debug, Subcommand)]
pub enum ReviewsCommands {
    /// List stored reviews, newest first
    List {
        /// Only reviews assigned to this topic (e.g. "Topic 1")
        #[arg(long)]
        topic: Option<String>,

        /// Only reviews with this sentiment (positive, neutral, negative, error)
        #[arg(long)]
        sentiment: Option<String>,

        /// Only reviews with this source tag
        #[arg(long)]
        source: Option<String>,

        /// Maximum number of reviews to show
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Count stored reviews per sentiment
    Summary,
}

/// Show stored reviews matching the given filters.
///
/// # Errors
///
/// Returns an error if the sentiment filter is not a known label or the
/// database query fails.
pub(crate) async fn run_reviews_list(
    pool: &sqlx::SqlitePool,
    topic: Option<&str>,
    sentiment: Option<&str>,
    source: Option<&str>,
    limit: i64,
) -> anyhow::Result<()> {
    let sentiment = sentiment
        .map(|s| s.parse::<SentimentLabel>().map_err(|e| anyhow::anyhow!(e)))
        .transpose()?;

    let filter = ReviewFilter {
        topic: topic.map(str::to_string),
        sentiment: sentiment.map(|s| s.as_str().to_string()),
        source: source.map(str::to_string),
        limit: Some(limit.max(1)),
    };

    let rows = reviewdb_db::list_reviews(pool, &filter).await?;
    if rows.is_empty() {
        println!("no reviews found; run `analyze <CSV> --save` first");
        return Ok(());
    }

    println!(
        "{:<6}{:<17}{:<15}{:<10}{:<8}{:<10}REVIEW",
        "ID", "SAVED", "SOURCE", "TOPIC", "SCORE", "SENTIMENT"
    );
    for row in &rows {
        let saved = row.created_at.format("%Y-%m-%d %H:%M").to_string();
        let score = row
            .score
            .map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));
        println!(
            "{:<6}{:<17}{:<15}{:<10}{:<8}{:<10}{}",
            row.id,
            saved,
            row.source,
            row.topic.as_deref().unwrap_or("-"),
            score,
            row.sentiment.as_deref().unwrap_or("-"),
            preview(&row.text_content)
        );
    }

    Ok(())
}

/// Print per-sentiment review counts.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_reviews_summary(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    let counts = reviewdb_db::count_reviews_by_sentiment(pool).await?;
    if counts.is_empty() {
        println!("no reviews stored");
        return Ok(());
    }

    let total: i64 = counts.iter().map(|(_, n)| n).sum();
    println!("{:<12}COUNT", "SENTIMENT");
    for (label, count) in &counts {
        println!("{:<12}{count}", label.as_deref().unwrap_or("(none)"));
    }
    println!("{:<12}{total}", "TOTAL");

    Ok(())
}
