use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    /// Overrides the database named in the URI.
    pub mongodb_database: Option<String>,
    /// When set, scored results are kept in Redis instead of on disk.
    pub redis_url: Option<String>,
    pub result_ttl_secs: u64,
    pub results_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_scored_titles: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            mongodb_uri: require_env("MONGODB_URI")?,
            mongodb_database: optional_env("MONGODB_DATABASE"),
            redis_url: optional_env("REDIS_URL"),
            result_ttl_secs: parse_env("RESULT_TTL_SECS", 86_400)?,
            results_dir: env_or("RESULTS_DIR", "static/Data").into(),
            templates_dir: env_or("TEMPLATES_DIR", "templates").into(),
            static_dir: env_or("STATIC_DIR", "static").into(),
            max_scored_titles: parse_env("MAX_SCORED_TITLES", 10)?,
            port: parse_env("PORT", 3316)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for router tests; nothing here touches the network.
    pub fn for_tests(results_dir: PathBuf) -> Self {
        Config {
            mongodb_uri: "mongodb://localhost:27017/jobfitt".to_string(),
            mongodb_database: None,
            redis_url: None,
            result_ttl_secs: 60,
            templates_dir: results_dir.join("templates"),
            static_dir: results_dir.join("static"),
            results_dir,
            max_scored_titles: 10,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
