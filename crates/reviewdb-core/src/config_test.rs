use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "REVIEWDB_ENV"));
}

#[test]
fn empty_environment_uses_defaults() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();

    assert_eq!(cfg.database_url, "sqlite://reviews.db");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.db_max_connections, 5);
    assert_eq!(cfg.db_acquire_timeout_secs, 10);
    assert!(cfg.classifier_url.is_none());
    assert_eq!(cfg.classifier_timeout_ms, 10_000);
    assert_eq!(cfg.sentiment_concurrency, 4);
    assert_eq!(cfg.topic_count, 2);
    assert_eq!(cfg.topic_keywords, 10);
    assert_eq!(cfg.topic_seed, 42);
    assert_eq!(cfg.topic_max_iter, 10);
    assert_eq!(cfg.fallback_language, Language::French);
    assert!(cfg.lexicon_dir.is_none());
}

#[test]
fn overrides_are_applied() {
    let mut map = HashMap::new();
    map.insert("DATABASE_URL", "sqlite::memory:");
    map.insert("REVIEWDB_CLASSIFIER_URL", "http://localhost:8080");
    map.insert("REVIEWDB_TOPIC_COUNT", "5");
    map.insert("REVIEWDB_TOPIC_SEED", "7");
    map.insert("REVIEWDB_FALLBACK_LANGUAGE", "EN");
    map.insert("REVIEWDB_LEXICON_DIR", "./lexicons");

    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.database_url, "sqlite::memory:");
    assert_eq!(cfg.classifier_url.as_deref(), Some("http://localhost:8080"));
    assert_eq!(cfg.topic_count, 5);
    assert_eq!(cfg.topic_seed, 7);
    assert_eq!(cfg.fallback_language, Language::English);
    assert_eq!(
        cfg.lexicon_dir.as_deref(),
        Some(std::path::Path::new("./lexicons"))
    );
}

#[test]
fn blank_classifier_url_is_treated_as_unset() {
    let mut map = HashMap::new();
    map.insert("REVIEWDB_CLASSIFIER_URL", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.classifier_url.is_none());
}

#[test]
fn zero_topic_count_is_rejected() {
    let mut map = HashMap::new();
    map.insert("REVIEWDB_TOPIC_COUNT", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "REVIEWDB_TOPIC_COUNT"
        ),
        "expected InvalidEnvVar(REVIEWDB_TOPIC_COUNT), got: {result:?}"
    );
}

#[test]
fn zero_sentiment_concurrency_is_rejected() {
    let mut map = HashMap::new();
    map.insert("REVIEWDB_SENTIMENT_CONCURRENCY", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. })
                if var == "REVIEWDB_SENTIMENT_CONCURRENCY"
        ),
        "expected InvalidEnvVar(REVIEWDB_SENTIMENT_CONCURRENCY), got: {result:?}"
    );
}

#[test]
fn non_numeric_timeout_is_rejected() {
    let mut map = HashMap::new();
    map.insert("REVIEWDB_CLASSIFIER_TIMEOUT_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. })
                if var == "REVIEWDB_CLASSIFIER_TIMEOUT_MS"
        ),
        "expected InvalidEnvVar(REVIEWDB_CLASSIFIER_TIMEOUT_MS), got: {result:?}"
    );
}

#[test]
fn unsupported_fallback_language_is_rejected() {
    let mut map = HashMap::new();
    map.insert("REVIEWDB_FALLBACK_LANGUAGE", "de");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "REVIEWDB_FALLBACK_LANGUAGE"
        ),
        "expected InvalidEnvVar(REVIEWDB_FALLBACK_LANGUAGE), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_urls() {
    let mut map = HashMap::new();
    map.insert("DATABASE_URL", "sqlite:///secret/path.db");
    map.insert("REVIEWDB_CLASSIFIER_URL", "http://internal-host:9000");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("secret"));
    assert!(!rendered.contains("internal-host"));
    assert!(rendered.contains("[redacted]"));
}
