//! Configuration management for the connector.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Sentinel value meaning "no API key configured".
pub const API_KEY_UNSET: &str = "NOT_SET";

/// Placeholder shipped in distributed config templates; treated as unset.
const API_KEY_PLACEHOLDER: &str = "PASTE_YOUR_UNIQUE_API_KEY_HERE";

/// Whether the given key is a real credential rather than a sentinel.
///
/// The default sentinel and the setup-template placeholder both count as
/// unset; fetch cycles skip all network calls until a real key is present.
pub fn api_key_set(api_key: &str) -> bool {
    api_key != API_KEY_UNSET && api_key != API_KEY_PLACEHOLDER
}

/// Default XiShop server API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.xishop.com/v1/server";

/// Default polling interval in seconds.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main connector configuration.
///
/// Persisted as JSON with the same kebab-case keys the shop publishes in its
/// setup instructions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shop API key authenticating this game server.
    #[serde(rename = "api-key", default = "default_api_key")]
    pub api_key: String,
    /// Base URL of the shop's server API.
    #[serde(rename = "api-url", default = "default_api_url")]
    pub api_url: String,
    /// Verbose logging of fetch cycles and response bodies.
    #[serde(rename = "debug-mode", default)]
    pub debug_mode: bool,
    /// Seconds between polls of the pending command queue.
    #[serde(rename = "check-interval-seconds", default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// Log level (trace, debug, info, warn, error).
    #[serde(rename = "log-level", default = "default_log_level")]
    pub log_level: String,
    /// Optional named pipe wired into the game server's console stdin.
    /// When unset, dispatched commands are only logged.
    #[serde(rename = "console-pipe", default, skip_serializing_if = "Option::is_none")]
    pub console_pipe: Option<String>,
}

fn default_api_key() -> String {
    API_KEY_UNSET.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_check_interval() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            api_url: default_api_url(),
            debug_mode: false,
            check_interval_seconds: default_check_interval(),
            log_level: default_log_level(),
            console_pipe: None,
        }
    }
}

impl Config {
    /// Load configuration from the standard location, falling back to defaults
    /// when no file exists yet.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        // Environment can only override the log level
        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the standard location.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let config_path = paths.config_file();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("XISHOP_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }

    /// Whether a usable API key is configured.
    pub fn api_key_set(&self) -> bool {
        api_key_set(&self.api_key)
    }

    /// Get the API URL as a parsed URL.
    pub fn api_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_url).map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_key, API_KEY_UNSET);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(!config.debug_mode);
        assert_eq!(config.check_interval_seconds, DEFAULT_CHECK_INTERVAL_SECS);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(config.console_pipe.is_none());
    }

    #[test]
    fn test_config_kebab_case_keys() {
        let config_json = r#"{
            "api-key": "secret-123",
            "api-url": "https://api.example.com/v1/server",
            "debug-mode": true,
            "check-interval-seconds": 30
        }"#;

        let config: Config = serde_json::from_str(config_json).unwrap();
        assert_eq!(config.api_key, "secret-123");
        assert_eq!(config.api_url, "https://api.example.com/v1/server");
        assert!(config.debug_mode);
        assert_eq!(config.check_interval_seconds, 30);
        // Unspecified keys fall back to defaults
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_api_key_sentinels_count_as_unset() {
        let mut config = Config::default();
        assert!(!config.api_key_set());

        config.api_key = "PASTE_YOUR_UNIQUE_API_KEY_HERE".to_string();
        assert!(!config.api_key_set());

        config.api_key = "real-key".to_string();
        assert!(config.api_key_set());
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let mut config = Config::default();
        config.api_key = "roundtrip-key".to_string();
        config.check_interval_seconds = 15;

        config.save(&paths).unwrap();

        let loaded = Config::load(&paths).unwrap();
        assert_eq!(loaded.api_key, "roundtrip-key");
        assert_eq!(loaded.check_interval_seconds, 15);
    }

    #[test]
    fn test_config_saved_file_uses_kebab_keys() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        Config::default().save(&paths).unwrap();

        let raw = std::fs::read_to_string(paths.config_file()).unwrap();
        assert!(raw.contains("\"api-key\""));
        assert!(raw.contains("\"check-interval-seconds\""));
        assert!(!raw.contains("api_key"));
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config::load(&paths).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(!config.api_key_set());
    }

    #[test]
    fn test_config_api_url_parse() {
        let config = Config::default();
        let url = config.api_url().unwrap();
        assert_eq!(url.scheme(), "https");
        assert!(url.host_str().unwrap().contains("xishop.com"));
    }

    #[test]
    fn test_config_invalid_url() {
        let mut config = Config::default();
        config.api_url = "not a valid url".to_string();

        let result = config.api_url();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, "{ this is not json").unwrap();

        let result = Config::load_from_file(&config_path);
        assert!(result.is_err());
    }
}
