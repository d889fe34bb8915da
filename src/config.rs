use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::storage::default_storage_dir;
use crate::{SummaryLength, SummaryOptions, SummaryStyle};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Summaries can take a while on CPU-only backends
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub default_length: Option<SummaryLength>,
    pub default_style: Option<SummaryStyle>,
    pub storage_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from ~/.config/ytsum/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn backend_url(&self) -> &str {
        self.backend_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn options(&self) -> SummaryOptions {
        SummaryOptions {
            length: self.default_length.unwrap_or_default(),
            style: self.default_style.unwrap_or_default(),
        }
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(default_storage_dir)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
backend_url = "http://summarizer.internal:9000"
timeout_secs = 120
default_length = "short"
default_style = "bullets"
storage_dir = "/var/lib/ytsum"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend_url(), "http://summarizer.internal:9000");
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.options().length, SummaryLength::Short);
        assert_eq!(config.options().style, SummaryStyle::Bullets);
        assert_eq!(config.storage_dir(), PathBuf::from("/var/lib/ytsum"));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.backend_url(), DEFAULT_BACKEND_URL);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.options(), SummaryOptions::default());
        assert_eq!(config.storage_dir(), default_storage_dir());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"default_style = "detailed""#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.options().style, SummaryStyle::Detailed);
        assert_eq!(config.options().length, SummaryLength::Medium);
        assert!(config.backend_url.is_none());
    }

    #[test]
    fn test_reject_unknown_length() {
        let toml_str = r#"default_length = "epic""#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }
}
