//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! which feed the fetch button downloads, where the feeds are served from,
//! and where the local store lives.
//!
//! Configuration is stored at `~/.config/quakecache/config.json`.
//! `QUAKECACHE_FEED_URL` and `QUAKECACHE_DATA_DIR` override the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_FEED_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::api::Feed;

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "quakecache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the feed base URL
pub const FEED_URL_ENV: &str = "QUAKECACHE_FEED_URL";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "QUAKECACHE_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed_base_url: String,
    /// Feed downloaded by the fetch button
    pub fetch_feed: Feed,
    pub data_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            fetch_feed: Feed::Month,
            data_dir: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load the config file (defaults if absent), then apply env overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var(FEED_URL_ENV).filter(|v| !v.is_empty()) {
            self.feed_base_url = url;
        }
        if let Some(dir) = var(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Directory holding the local store and logs
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"fetch_feed": "week"}"#).expect("parses");
        assert_eq!(config.fetch_feed, Feed::Week);
        assert_eq!(config.feed_base_url, DEFAULT_FEED_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            FEED_URL_ENV => Some("http://localhost:8080/feeds".to_string()),
            DATA_DIR_ENV => Some("/tmp/quakes".to_string()),
            _ => None,
        });
        assert_eq!(config.feed_base_url, "http://localhost:8080/feeds");
        assert_eq!(config.data_dir().expect("data dir"), PathBuf::from("/tmp/quakes"));
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(|_| Some(String::new()));
        assert_eq!(config.feed_base_url, DEFAULT_FEED_BASE_URL);
        assert!(config.data_dir.is_none());
    }
}
