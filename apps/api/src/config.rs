use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const DEFAULT_UPLOAD_SUBDIR: &str = "resume-match-uploads";

/// Application configuration loaded from environment variables.
///
/// The inference credential is optional at startup: its absence is reported
/// once in the log and then surfaces as a configuration error on every
/// analysis request, before any network call is attempted.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub llm_timeout: Duration,
    pub upload_dir: PathBuf,
    /// Sliding time-to-live for uploaded files.
    pub file_ttl: Duration,
    /// Period of the background sweep, independent of `file_ttl`.
    pub sweep_interval: Duration,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: optional_env("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 60)?),
            upload_dir: optional_env("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_UPLOAD_SUBDIR)),
            file_ttl: Duration::from_secs(parse_env("FILE_TTL_SECS", 30 * 60)?),
            sweep_interval: Duration::from_secs(parse_env("SWEEP_INTERVAL_SECS", 5 * 60)?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Returns the variable's value, treating an empty string as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value: '{raw}'"))
}
