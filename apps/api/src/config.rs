use anyhow::{Context, Result};

use crate::matching::StrategyKind;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Which match engine backend to run. Selected explicitly here, never implicitly.
    pub match_strategy: StrategyKind,
    /// Minimum similarity score for the similarity backend. Below → unmatched.
    pub score_threshold: f64,
    /// Whole-run deadline. On expiry the run fails and nothing is persisted.
    pub run_timeout_secs: u64,
    /// Bound on concurrent per-document extraction/structuring work.
    pub max_concurrent_docs: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            match_strategy: std::env::var("MATCH_STRATEGY")
                .unwrap_or_else(|_| "similarity".to_string())
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("MATCH_STRATEGY must be 'similarity' or 'reasoning'")?,
            score_threshold: std::env::var("SCORE_THRESHOLD")
                .unwrap_or_else(|_| "0.5".to_string())
                .parse::<f64>()
                .context("SCORE_THRESHOLD must be a number in [0,1]")?,
            run_timeout_secs: std::env::var("RUN_TIMEOUT_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse::<u64>()
                .context("RUN_TIMEOUT_SECS must be a number of seconds")?,
            max_concurrent_docs: std::env::var("MAX_CONCURRENT_DOCS")
                .unwrap_or_else(|_| "4".to_string())
                .parse::<usize>()
                .context("MAX_CONCURRENT_DOCS must be a positive integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
