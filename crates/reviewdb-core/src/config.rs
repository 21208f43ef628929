use crate::app_config::{AppConfig, Environment};
use crate::{ConfigError, Language};

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a working
/// local setup backed by `reviews.db` in the current directory.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let non_empty = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let database_url = or_default("DATABASE_URL", "sqlite://reviews.db");
    let env = parse_environment(&or_default("REVIEWDB_ENV", "development"))?;
    let log_level = or_default("REVIEWDB_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("REVIEWDB_DB_MAX_CONNECTIONS", "5")?;
    let db_acquire_timeout_secs = parse_u64("REVIEWDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let classifier_url = non_empty("REVIEWDB_CLASSIFIER_URL");
    let classifier_timeout_ms = parse_u64("REVIEWDB_CLASSIFIER_TIMEOUT_MS", "10000")?;
    let sentiment_concurrency = parse_positive("REVIEWDB_SENTIMENT_CONCURRENCY", "4")?;

    let topic_count = parse_positive("REVIEWDB_TOPIC_COUNT", "2")?;
    let topic_keywords = parse_positive("REVIEWDB_TOPIC_KEYWORDS", "10")?;
    let topic_seed = parse_u64("REVIEWDB_TOPIC_SEED", "42")?;
    let topic_max_iter = parse_positive("REVIEWDB_TOPIC_MAX_ITER", "10")?;

    let raw_fallback = or_default("REVIEWDB_FALLBACK_LANGUAGE", "fr");
    let fallback_language = Language::from_code(&raw_fallback).ok_or_else(|| {
        invalid(
            "REVIEWDB_FALLBACK_LANGUAGE",
            format!("unsupported language code '{raw_fallback}' (expected fr or en)"),
        )
    })?;

    let lexicon_dir = non_empty("REVIEWDB_LEXICON_DIR").map(PathBuf::from);

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_acquire_timeout_secs,
        classifier_url,
        classifier_timeout_ms,
        sentiment_concurrency,
        topic_count,
        topic_keywords,
        topic_seed,
        topic_max_iter,
        fallback_language,
        lexicon_dir,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVIEWDB_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
