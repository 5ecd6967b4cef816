//! JSON configuration types for webproxy.
//!
//! [`AppConfig`] is deserialized from `config.json` in the working directory
//! (or the path given with `--config`). The field names follow the file
//! format already deployed alongside the proxy.
//!
//! # Example `config.json`
//!
//! ```json
//! {
//!     "proxyport": 8081,
//!     "defaulton": true,
//!     "whitelist": [],
//!     "blacklist": ["ads.example.net"]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::store::PolicyStore;
use crate::error::Result;

/// Port the data-plane proxy listens on when a fresh config is generated.
pub const DEFAULT_PROXY_PORT: u16 = 8081;

/// Top-level application configuration deserialized from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Listening port for the data-plane proxy.
    pub proxyport: u16,
    /// Initial value of the master switch.
    pub defaulton: bool,
    /// URL substrings that are allowed; when non-empty everything else is refused.
    #[serde(default)]
    pub whitelist: Vec<String>,
    /// URL substrings that are refused; only consulted when `whitelist` is empty.
    #[serde(default)]
    pub blacklist: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            proxyport: DEFAULT_PROXY_PORT,
            defaulton: true,
            whitelist: Vec::new(),
            blacklist: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load and parse the configuration from a JSON file at the given path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load the configuration, writing the default file first if none exists.
    ///
    /// An existing file that cannot be read or parsed is an error; it is
    /// never overwritten.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default = AppConfig::default();
            std::fs::write(path, serde_json::to_string_pretty(&default)?)?;
            info!("Generated default config at {}", path.display());
        }
        Self::load_from_path(path)
    }

    /// Build the shared policy store seeded from this configuration.
    pub fn to_store(&self) -> PolicyStore {
        PolicyStore::new(
            self.defaulton,
            self.whitelist.clone(),
            self.blacklist.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_open() {
        let config = AppConfig::default();
        assert_eq!(config.proxyport, 8081);
        assert!(config.defaulton);
        assert!(config.whitelist.is_empty());
        assert!(config.blacklist.is_empty());
    }

    #[test]
    fn load_or_create_writes_default_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(!path.exists());

        let config = AppConfig::load_or_create(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["proxyport"], 8081);
        assert_eq!(written["defaulton"], true);
        assert_eq!(written["whitelist"], serde_json::json!([]));
        assert_eq!(written["blacklist"], serde_json::json!([]));
    }

    #[test]
    fn load_or_create_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let content = r#"{"proxyport": 3128, "defaulton": false, "whitelist": ["example.com"], "blacklist": []}"#;
        std::fs::write(&path, content).unwrap();

        let config = AppConfig::load_or_create(&path).unwrap();
        assert_eq!(config.proxyport, 3128);
        assert!(!config.defaulton);
        assert_eq!(config.whitelist, vec!["example.com"]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn malformed_existing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::load_or_create(&path).unwrap_err();
        assert!(matches!(err, crate::error::WebProxyError::ConfigParse(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let config: AppConfig =
            serde_json::from_str(r#"{"proxyport": 8081, "defaulton": true}"#).unwrap();
        assert!(config.whitelist.is_empty());
        assert!(config.blacklist.is_empty());
    }

    #[test]
    fn to_store_seeds_flag_and_lists() {
        let config = AppConfig {
            proxyport: 8081,
            defaulton: false,
            whitelist: vec!["a.com".to_string()],
            blacklist: vec!["b.com".to_string()],
        };
        let snapshot = config.to_store().get();
        assert!(!snapshot.enabled);
        assert_eq!(snapshot.allow_list, vec!["a.com"]);
        assert_eq!(snapshot.deny_list, vec!["b.com"]);
    }
}
