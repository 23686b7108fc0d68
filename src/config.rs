use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};

pub const DEFAULT_SEARCH_URL: &str = "https://itunes.apple.com/search";
pub const DEFAULT_MEDIA: &str = "music";
pub const DEFAULT_RESULT_LIMIT: u32 = 20;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// The iTunes Search API refuses anything above this.
const MAX_RESULT_LIMIT: u32 = 200;

#[derive(Debug, Clone)]
pub struct Config {
    pub search_url: Url,
    pub media: String,
    pub result_limit: u32,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_url: Url::parse(DEFAULT_SEARCH_URL).expect("default search URL is valid"),
            media: DEFAULT_MEDIA.to_string(),
            result_limit: DEFAULT_RESULT_LIMIT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to the
    /// defaults for anything unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let search_url = match get("CATALOG_SEARCH_URL") {
            Some(raw) => Url::parse(raw.trim()).map_err(|e| {
                AppError::Config(format!("CATALOG_SEARCH_URL is not a valid URL: {}", e))
            })?,
            None => Url::parse(DEFAULT_SEARCH_URL)
                .map_err(|e| AppError::Config(e.to_string()))?,
        };

        if !matches!(search_url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "CATALOG_SEARCH_URL must be http or https, got {}",
                search_url.scheme()
            )));
        }

        let media = get("CATALOG_MEDIA")
            .map(|m| m.trim().to_string())
            .unwrap_or_else(|| DEFAULT_MEDIA.to_string());

        let result_limit = match get("CATALOG_RESULT_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=MAX_RESULT_LIMIT).contains(n))
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "CATALOG_RESULT_LIMIT must be between 1 and {}, got {}",
                        MAX_RESULT_LIMIT, raw
                    ))
                })?,
            None => DEFAULT_RESULT_LIMIT,
        };

        let timeout_secs = match get("CATALOG_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "CATALOG_TIMEOUT_SECS must be a positive number of seconds, got {}",
                        raw
                    ))
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            search_url,
            media,
            result_limit,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
