//! Client configuration management.
//!
//! The client needs two base URLs: the front-end origin that serves the
//! session endpoints and the backend API that serves family data.
//!
//! Configuration is stored at `~/.config/famdiary/config.json`; the
//! `FAMDIARY_APP_URL` and `FAMDIARY_API_URL` environment variables take
//! precedence over the file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Application name used for the config directory path
const APP_NAME: &str = "famdiary";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEFAULT_API_URL: &str = "http://localhost:8082";

const APP_URL_ENV: &str = "FAMDIARY_APP_URL";
const API_URL_ENV: &str = "FAMDIARY_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin serving `/api/auth/me` and `/api/auth/logout`
    pub app_url: String,
    /// Backend API base URL
    pub api_url: String,
    /// Request timeout; unset means the transport default
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app_url: DEFAULT_APP_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Load from the config file (if any), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        debug!(app_url = %config.app_url, api_url = %config.api_url, "Client config loaded");
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

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(APP_URL_ENV).filter(|v| !v.is_empty()) {
            self.app_url = url;
        }
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
    }

    /// Full URL of a backend API path
    pub fn api_endpoint(&self, path: &str) -> String {
        join_url(&self.api_url, path)
    }

    /// Full URL of a path on the front-end origin
    pub fn app_endpoint(&self, path: &str) -> String {
        join_url(&self.app_url, path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_endpoint_joins_slashes() {
        let config = ClientConfig {
            api_url: "http://api.example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.api_endpoint("/families/me"), "http://api.example.com/families/me");
        assert_eq!(config.api_endpoint("families/me"), "http://api.example.com/families/me");
    }

    #[test]
    fn test_app_endpoint() {
        let config = ClientConfig::default();
        assert_eq!(config.app_endpoint("/api/auth/me"), "http://localhost:3000/api/auth/me");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = ClientConfig::default();
        config.apply_overrides(|key| match key {
            API_URL_ENV => Some("https://api.family.example".to_string()),
            APP_URL_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.api_url, "https://api.family.example");
        // Empty values are ignored
        assert_eq!(config.app_url, DEFAULT_APP_URL);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"api_url":"http://x"}"#).unwrap();
        assert_eq!(config.api_url, "http://x");
        assert_eq!(config.app_url, DEFAULT_APP_URL);
        assert_eq!(config.request_timeout_secs, None);
    }
}
