//! CSV upload parsing and enriched export.

use std::path::Path;

use anyhow::Context;
use reviewdb_analysis::{AnalyzedBatch, Batch};

/// Header names recognized as the review text column, case-insensitively.
pub(crate) const TEXT_COLUMN_ALIASES: [&str; 5] =
    ["commentaire", "comment", "avis", "review", "text"];

/// Header carrying a per-row source tag.
pub(crate) const SOURCE_COLUMN: &str = "source";

/// Columns appended to every exported row, in order.
pub(crate) const ENRICHED_COLUMNS: [&str; 5] =
    ["language", "cleaned_text", "sentiment", "sentiment_score", "topic"];

/// Read a CSV file into a [`Batch`]. Rows may be ragged.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or is not valid CSV.
pub(crate) fn read_batch(path: &Path) -> anyhow::Result<Batch> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read header row of {}", path.display()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("invalid CSV record {} in {}", idx + 1, path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Batch::new(headers, rows))
}

/// Pick the header holding review text.
///
/// An explicit name must match a header (case-insensitively); otherwise the
/// first header in file order that matches an alias wins.
///
/// # Errors
///
/// Returns an error naming the available headers when nothing matches.
pub(crate) fn resolve_text_column(
    headers: &[String],
    explicit: Option<&str>,
) -> anyhow::Result<String> {
    let found = match explicit {
        Some(name) => headers.iter().find(|h| h.eq_ignore_ascii_case(name.trim())),
        None => headers.iter().find(|h| {
            TEXT_COLUMN_ALIASES
                .iter()
                .any(|alias| h.eq_ignore_ascii_case(alias))
        }),
    };

    found.cloned().ok_or_else(|| {
        let wanted = explicit.map_or_else(
            || format!("one of [{}]", TEXT_COLUMN_ALIASES.join(", ")),
            |name| format!("'{name}'"),
        );
        anyhow::anyhow!(
            "no text column matching {wanted}; headers are [{}]",
            headers.join(", ")
        )
    })
}

/// Per-row source tags: the `source` column when present, else `default`.
pub(crate) fn source_tags(batch: &Batch, default: Option<&str>) -> Vec<Option<String>> {
    let column = batch
        .headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(SOURCE_COLUMN));
    (0..batch.len())
        .map(|row| {
            column
                .map(|col| batch.cell(row, col).trim())
                .filter(|s| !s.is_empty())
                .or(default)
                .map(str::to_string)
        })
        .collect()
}

/// Write the original columns plus the analysis columns to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub(crate) fn write_enriched(path: &Path, analyzed: &AnalyzedBatch) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let header: Vec<&str> = analyzed
        .batch
        .headers
        .iter()
        .map(String::as_str)
        .chain(ENRICHED_COLUMNS)
        .collect();
    writer.write_record(&header)?;

    let width = analyzed.batch.headers.len();
    for (row, doc) in analyzed.documents.iter().enumerate() {
        let mut record: Vec<String> = (0..width)
            .map(|col| analyzed.batch.cell(row, col).to_string())
            .collect();
        record.push(doc.language.code().to_string());
        record.push(doc.cleaned_text.clone());
        record.push(doc.sentiment.label.to_string());
        record.push(format!("{:.4}", doc.sentiment.confidence));
        record.push(doc.topic.clone().unwrap_or_default());
        writer.write_record(&record)?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}
