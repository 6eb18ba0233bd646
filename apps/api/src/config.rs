use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::gateway::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
use crate::gateway::rate_limiter::{DEFAULT_INTERVAL, DEFAULT_MAX_TRACKED_IDENTITIES};
use crate::gateway::DEFAULT_MODEL_TIMEOUT;
use crate::llm_client::DEFAULT_ANTHROPIC_API_URL;

/// Per-window call budget for each analysis endpoint unless overridden.
const DEFAULT_ENDPOINT_RATE_LIMIT: u32 = 5;

/// How the rate limiter identity is derived for an inbound request.
///
/// With a header configured, each distinct header value gets its own window.
/// Requests without it (or with no header configured) share `fixed`.
#[derive(Debug, Clone)]
pub struct RateLimitIdentity {
    pub header: Option<String>,
    pub fixed: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a number does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_api_url: String,
    pub port: u16,
    pub rust_log: String,
    pub rate_limit_interval: Duration,
    pub rate_limit_max_identities: usize,
    pub analyze_rate_limit: u32,
    pub questions_rate_limit: u32,
    pub identity: RateLimitIdentity,
    pub cache_max_entries: usize,
    pub cache_ttl: Duration,
    pub model_timeout: Duration,
    pub sweep_interval: Duration,
    pub max_request_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            anthropic_api_url: std::env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_API_URL.to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            rate_limit_interval: Duration::from_millis(parse_env(
                "RATE_LIMIT_INTERVAL_MS",
                DEFAULT_INTERVAL.as_millis() as u64,
            )?),
            rate_limit_max_identities: parse_env(
                "RATE_LIMIT_MAX_IDENTITIES",
                DEFAULT_MAX_TRACKED_IDENTITIES,
            )?,
            analyze_rate_limit: parse_env("ANALYZE_RATE_LIMIT", DEFAULT_ENDPOINT_RATE_LIMIT)?,
            questions_rate_limit: parse_env("QUESTIONS_RATE_LIMIT", DEFAULT_ENDPOINT_RATE_LIMIT)?,
            identity: RateLimitIdentity {
                header: std::env::var("RATE_LIMIT_IDENTITY_HEADER")
                    .ok()
                    .filter(|h| !h.trim().is_empty()),
                fixed: std::env::var("RATE_LIMIT_FIXED_IDENTITY")
                    .unwrap_or_else(|_| "global".to_string()),
            },
            cache_max_entries: parse_env("CACHE_MAX_ENTRIES", DEFAULT_MAX_ENTRIES)?,
            cache_ttl: Duration::from_secs(parse_env("CACHE_TTL_SECS", DEFAULT_TTL.as_secs())?),
            model_timeout: Duration::from_secs(parse_env(
                "MODEL_TIMEOUT_SECS",
                DEFAULT_MODEL_TIMEOUT.as_secs(),
            )?),
            sweep_interval: Duration::from_secs(parse_env("STORE_SWEEP_INTERVAL_SECS", 60)?),
            max_request_bytes: parse_env("MAX_REQUEST_BYTES", 256 * 1024)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
