use std::path::PathBuf;

use crate::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub classifier_url: Option<String>,
    pub classifier_timeout_ms: u64,
    pub sentiment_concurrency: usize,
    pub topic_count: usize,
    pub topic_keywords: usize,
    pub topic_seed: u64,
    pub topic_max_iter: usize,
    pub fallback_language: Language,
    pub lexicon_dir: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "classifier_url",
                &self.classifier_url.as_ref().map(|_| "[redacted]"),
            )
            .field("classifier_timeout_ms", &self.classifier_timeout_ms)
            .field("sentiment_concurrency", &self.sentiment_concurrency)
            .field("topic_count", &self.topic_count)
            .field("topic_keywords", &self.topic_keywords)
            .field("topic_seed", &self.topic_seed)
            .field("topic_max_iter", &self.topic_max_iter)
            .field("fallback_language", &self.fallback_language)
            .field("lexicon_dir", &self.lexicon_dir)
            .finish()
    }
}
