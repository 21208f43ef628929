//! `analyze` command: run the pipeline over an uploaded CSV.

use std::path::PathBuf;

use clap::Args;
use reviewdb_analysis::{AnalyzedBatch, Pipeline, SentimentLabel};
use reviewdb_core::AppConfig;
use reviewdb_db::NewReview;

use crate::ingest;

/// Rows shown in the post-analysis preview.
const PREVIEW_ROWS: usize = 5;
const PREVIEW_TEXT_WIDTH: usize = 40;

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// CSV file containing one review per row
    pub input: PathBuf,

    /// Name of the review text column (defaults to the first recognized alias)
    #[arg(long)]
    pub column: Option<String>,

    /// Number of topics to fit (overrides REVIEWDB_TOPIC_COUNT)
    #[arg(long)]
    pub topics: Option<usize>,

    /// Write the enriched rows to this CSV file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Persist the analyzed reviews to the database
    #[arg(long)]
    pub save: bool,

    /// Source tag for rows without a `source` column value
    #[arg(long)]
    pub source: Option<String>,
}

/// Analyze a CSV file, print a summary and optionally export and persist.
///
/// # Errors
///
/// Returns an error if the file cannot be read, no text column is found, the
/// topic configuration is infeasible, or export/persistence fails.
pub(crate) async fn run_analyze(config: &AppConfig, args: &AnalyzeArgs) -> anyhow::Result<()> {
    let batch = ingest::read_batch(&args.input)?;
    let text_column = ingest::resolve_text_column(&batch.headers, args.column.as_deref())?;

    if batch.is_empty() {
        println!("{} has no rows; nothing to analyze", args.input.display());
        return Ok(());
    }

    let mut pipeline = Pipeline::from_config(config).await;
    if let Some(k) = args.topics {
        pipeline = pipeline.with_topic_count(k);
    }

    let analyzed = pipeline.analyze(batch, &text_column).await?;
    print_summary(&analyzed);

    if let Some(output) = &args.output {
        ingest::write_enriched(output, &analyzed)?;
        println!("enriched rows written to {}", output.display());
    }

    if args.save {
        let pool = crate::connect(config).await?;
        let sources = ingest::source_tags(&analyzed.batch, args.source.as_deref());
        let rows: Vec<NewReview> = analyzed
            .documents
            .iter()
            .zip(&sources)
            .map(|(doc, source)| NewReview::from_document(doc, source.as_deref()))
            .collect();
        let saved = reviewdb_db::insert_reviews(&pool, &rows).await?;
        println!("{saved} reviews saved");
    }

    Ok(())
}

fn print_summary(analyzed: &AnalyzedBatch) {
    println!(
        "analyzed {} reviews from column '{}'",
        analyzed.documents.len(),
        analyzed.text_column
    );

    println!();
    if analyzed.topics.is_empty() {
        println!("topics: none (vocabulary empty after cleaning)");
    } else {
        for (label, keywords) in analyzed.topic_keywords() {
            println!("{label}: {keywords}");
        }
    }

    println!();
    let counts = analyzed.sentiment_counts();
    for label in SentimentLabel::ALL {
        println!(
            "{:<10}{}",
            label.as_str(),
            counts.get(&label).copied().unwrap_or(0)
        );
    }

    println!();
    println!("{:<42}{:<6}{:<10}{:<8}TOPIC", "REVIEW", "LANG", "SENTIMENT", "SCORE");
    for doc in analyzed.documents.iter().take(PREVIEW_ROWS) {
        println!(
            "{:<42}{:<6}{:<10}{:<8.2}{}",
            preview(&doc.raw_text),
            doc.language.code(),
            doc.sentiment.label.as_str(),
            doc.sentiment.confidence,
            doc.topic.as_deref().unwrap_or("-")
        );
    }
}

/// Single-line prefix of `text` for table display.
pub(crate) fn preview(text: &str) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_TEXT_WIDTH {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_TEXT_WIDTH - 3).collect();
    format!("{cut}...")
}
