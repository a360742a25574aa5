use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ExtractError, Result};
use crate::source::youtube::DEFAULT_ENDPOINT;

/// Configuration for the extraction engine and its comment source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Comment source settings
    pub source: SourceConfig,

    /// Extraction pipeline settings
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the comment API
    pub endpoint: String,

    /// API key; the YOUTUBE_API_KEY environment variable also works
    pub api_key: Option<String>,

    /// Comments requested per page
    pub page_size: u32,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            page_size: 50,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Cap on total comments processed per run
    pub max_comments: usize,

    /// Pause between successful page fetches (milliseconds)
    pub page_delay_ms: u64,

    /// Minimum spacing between kept entries for comment-sourced extraction
    pub comment_dedup_gap_seconds: u32,

    /// Minimum spacing between kept entries for manually pasted text
    pub manual_dedup_gap_seconds: u32,

    /// Caption truncation limit in characters
    pub max_caption_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_comments: 500,
            page_delay_ms: 100,
            comment_dedup_gap_seconds: 3,
            manual_dedup_gap_seconds: 5,
            max_caption_length: 150,
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, falling back
    /// to defaults when none exists.
    pub fn load() -> Result<Self> {
        let config_paths = [
            "chapter-extract.toml",
            "config/chapter-extract.toml",
            "~/.config/chapter-extract/config.toml",
        ];

        for path in config_paths {
            let expanded = expand_home(path);
            if Path::new(&expanded).exists() {
                debug!("📋 Loading config from {}", expanded);
                return Self::load_from(&expanded);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| ExtractError::Config(e.to_string()))
    }

    /// Write the configuration as pretty TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ExtractError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// API key resolution: explicit argument, then config file, then the
    /// YOUTUBE_API_KEY environment variable.
    pub fn resolved_api_key(&self, explicit: Option<String>) -> Option<String> {
        explicit
            .or_else(|| self.source.api_key.clone())
            .or_else(|| std::env::var("YOUTUBE_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

fn expand_home(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{}/{}", home, rest);
        }
        warn!("⚠️ HOME not set, skipping {}", path);
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.extraction.max_comments, 500);
        assert_eq!(config.extraction.page_delay_ms, 100);
        assert_eq!(config.extraction.comment_dedup_gap_seconds, 3);
        assert_eq!(config.extraction.manual_dedup_gap_seconds, 5);
        assert_eq!(config.extraction.max_caption_length, 150);
        assert_eq!(config.source.page_size, 50);
        assert!(config.source.endpoint.contains("googleapis.com"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [extraction]
            max_comments = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.extraction.max_comments, 100);
        assert_eq!(config.extraction.comment_dedup_gap_seconds, 3);
        assert_eq!(config.source.page_size, 50);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.extraction.max_comments = 42;
        config.source.api_key = Some("test-key".to_string());
        config.save(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.extraction.max_comments, 42);
        assert_eq!(loaded.source.api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn test_api_key_resolution_order() {
        let mut config = Config::default();
        config.source.api_key = Some("from-config".to_string());

        assert_eq!(
            config.resolved_api_key(Some("explicit".to_string())).as_deref(),
            Some("explicit")
        );
        assert_eq!(config.resolved_api_key(None).as_deref(), Some("from-config"));
    }
}
