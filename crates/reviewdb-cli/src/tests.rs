use super::*;

use std::path::PathBuf;

use reviewdb_analysis::{AnalyzedBatch, Batch, Document, SentimentLabel, SentimentResult, Topic};
use reviewdb_core::Language;

use crate::ingest::{read_batch, resolve_text_column, source_tags, write_enriched};

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["reviewdb", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["reviewdb", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn help_is_handled_by_parsing() {
    for args in [vec!["reviewdb", "--help"], vec!["reviewdb", "analyze", "--help"]] {
        let err = Cli::try_parse_from(args).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}

#[test]
fn no_command_skips_config_loading() {
    let cli = Cli::try_parse_from(["reviewdb"]).unwrap();
    let configured = configure(cli, || panic!("config must not be loaded")).unwrap();
    assert!(configured.is_none());
}

#[test]
fn invalid_config_fails_only_after_parsing_a_command() {
    let cli = Cli::try_parse_from(["reviewdb", "db", "ping"]).unwrap();
    let err = configure(cli, || {
        Err(ConfigError::InvalidEnvVar {
            var: "REVIEWDB_TOPIC_COUNT".to_string(),
            reason: "must be at least 1".to_string(),
        })
    })
    .unwrap_err();
    assert!(err.to_string().contains("REVIEWDB_TOPIC_COUNT"));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["reviewdb"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn analyze_defaults() {
    let cli = Cli::try_parse_from(["reviewdb", "analyze", "avis.csv"]).unwrap();
    let Some(Commands::Analyze(args)) = cli.command else {
        panic!("expected analyze command");
    };
    assert_eq!(args.input, PathBuf::from("avis.csv"));
    assert!(args.column.is_none());
    assert!(args.topics.is_none());
    assert!(args.output.is_none());
    assert!(!args.save);
    assert!(args.source.is_none());
}

#[test]
fn analyze_with_all_flags() {
    let cli = Cli::try_parse_from([
        "reviewdb",
        "analyze",
        "avis.csv",
        "--column",
        "Commentaire",
        "--topics",
        "3",
        "--output",
        "out.csv",
        "--save",
        "--source",
        "trustpilot",
    ])
    .unwrap();
    let Some(Commands::Analyze(args)) = cli.command else {
        panic!("expected analyze command");
    };
    assert_eq!(args.column.as_deref(), Some("Commentaire"));
    assert_eq!(args.topics, Some(3));
    assert_eq!(args.output, Some(PathBuf::from("out.csv")));
    assert!(args.save);
    assert_eq!(args.source.as_deref(), Some("trustpilot"));
}

#[test]
fn analyze_requires_input() {
    assert!(Cli::try_parse_from(["reviewdb", "analyze"]).is_err());
}

#[test]
fn reviews_list_defaults_limit() {
    let cli = Cli::try_parse_from(["reviewdb", "reviews", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Reviews {
            command: ReviewsCommands::List {
                topic: None,
                sentiment: None,
                source: None,
                limit: 20
            }
        })
    ));
}

#[test]
fn reviews_list_with_filters() {
    let cli = Cli::try_parse_from([
        "reviewdb",
        "reviews",
        "list",
        "--topic",
        "Topic 2",
        "--sentiment",
        "negative",
        "--limit",
        "5",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Reviews {
            command: ReviewsCommands::List {
                topic: Some(ref t),
                sentiment: Some(ref s),
                source: None,
                limit: 5
            }
        }) if t == "Topic 2" && s == "negative"
    ));
}

#[test]
fn parses_reviews_summary() {
    let cli = Cli::try_parse_from(["reviewdb", "reviews", "summary"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Reviews {
            command: ReviewsCommands::Summary
        })
    ));
}

#[test]
fn text_column_found_by_alias_case_insensitively() {
    let h = headers(&["id", "Commentaire", "note"]);
    assert_eq!(resolve_text_column(&h, None).unwrap(), "Commentaire");
}

#[test]
fn text_column_prefers_first_header_in_file_order() {
    let h = headers(&["Text", "review"]);
    assert_eq!(resolve_text_column(&h, None).unwrap(), "Text");
}

#[test]
fn explicit_text_column_must_exist() {
    let h = headers(&["id", "body"]);
    assert_eq!(resolve_text_column(&h, Some("BODY")).unwrap(), "body");
    let err = resolve_text_column(&h, Some("comment")).unwrap_err();
    assert!(err.to_string().contains("'comment'"));
}

#[test]
fn missing_text_column_lists_headers() {
    let h = headers(&["id", "rating"]);
    let err = resolve_text_column(&h, None).unwrap_err();
    assert!(err.to_string().contains("id, rating"));
}

#[test]
fn source_tags_prefer_column_then_default() {
    let batch = Batch::new(
        headers(&["avis", "Source"]),
        vec![
            vec!["a".to_string(), "web".to_string()],
            vec!["b".to_string(), " ".to_string()],
            vec!["c".to_string()],
        ],
    );
    assert_eq!(
        source_tags(&batch, Some("upload")),
        vec![
            Some("web".to_string()),
            Some("upload".to_string()),
            Some("upload".to_string())
        ]
    );

    let bare = Batch::from_texts("avis", &["a"]);
    assert_eq!(source_tags(&bare, None), vec![None]);
}

#[test]
fn read_batch_handles_quotes_and_ragged_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("avis.csv");
    std::fs::write(
        &path,
        "\u{feff}id,commentaire\n1,\"Bien, mais cher\"\n2\n3,\"Très \"\"bon\"\" produit\"\n",
    )
    .unwrap();

    let batch = read_batch(&path).unwrap();
    assert_eq!(batch.headers, headers(&["id", "commentaire"]));
    assert_eq!(batch.len(), 3);
    assert_eq!(
        batch.column("commentaire").unwrap(),
        ["Bien, mais cher", "", "Très \"bon\" produit"]
    );
}

#[test]
fn read_batch_reports_missing_file() {
    let err = read_batch(std::path::Path::new("/nonexistent/avis.csv")).unwrap_err();
    assert!(err.to_string().contains("failed to open"));
}

#[test]
fn write_enriched_appends_analysis_columns() {
    let batch = Batch::new(
        headers(&["id", "avis"]),
        vec![
            vec!["1".to_string(), "J'aime ce produit".to_string()],
            vec!["2".to_string(), String::new()],
        ],
    );
    let analyzed = AnalyzedBatch {
        batch,
        text_column: "avis".to_string(),
        documents: vec![
            Document {
                raw_text: "J'aime ce produit".to_string(),
                language: Language::French,
                cleaned_text: "aimer produit".to_string(),
                sentiment: SentimentResult::new(SentimentLabel::Positive, 0.75),
                topic: Some("Topic 1".to_string()),
            },
            Document {
                raw_text: String::new(),
                language: Language::French,
                cleaned_text: String::new(),
                sentiment: SentimentResult::NEUTRAL_DEFAULT,
                topic: None,
            },
        ],
        topics: vec![Topic {
            id: 0,
            label: "Topic 1".to_string(),
            keywords: vec!["aimer".to_string(), "produit".to_string()],
        }],
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    write_enriched(&path, &analyzed).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines,
        [
            "id,avis,language,cleaned_text,sentiment,sentiment_score,topic",
            "1,J'aime ce produit,fr,aimer produit,Positive,0.7500,Topic 1",
            "2,,fr,,Neutral,0.0000,",
        ]
    );
}

#[test]
fn preview_flattens_and_truncates() {
    assert_eq!(analyze::preview("a\n  b"), "a b");
    let long = "x".repeat(100);
    let p = analyze::preview(&long);
    assert_eq!(p.chars().count(), 40);
    assert!(p.ends_with("..."));
}
