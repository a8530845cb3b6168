//! Loading of `config.toml` into [`ClientConfig`].

use crate::paths::FinchatPaths;
use finchat_core::config::ClientConfig;
use finchat_core::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `api_base_url`.
pub const API_URL_ENV: &str = "FINCHAT_API_URL";

/// Read-only access to the client configuration file.
///
/// A missing or empty file is not an error: the defaults apply. Environment
/// overrides are applied on top of whatever the file provides.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Uses the default path (`~/.config/finchat/config.toml`).
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(FinchatPaths::config_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration with environment overrides applied.
    pub fn load(&self) -> Result<ClientConfig> {
        let config = self.load_file()?;
        Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
    }

    fn load_file(&self) -> Result<ClientConfig> {
        if !self.path.exists() {
            tracing::debug!("No config file at {}, using defaults", self.path.display());
            return Ok(ClientConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ClientConfig::default());
        }

        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Applies environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(mut config: ClientConfig, lookup: F) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.api_base_url = url;
    }
    config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use finchat_core::config::DEFAULT_API_BASE_URL;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let storage = ConfigStorage::with_path(dir.path().join("config.toml"));
        let config = storage.load_file().unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_file_values_are_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_base_url = \"https://faq.example/api/\"\nstorage_namespace = \"bank\"\n",
        )
        .unwrap();

        let config = ConfigStorage::with_path(&path).load_file().unwrap();
        assert_eq!(config.storage_namespace, "bank");
        let config = apply_env_overrides(config, |_| None);
        assert_eq!(config.api_base_url, "https://faq.example/api");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_base_url = [").unwrap();
        let err = ConfigStorage::with_path(&path).load_file().unwrap_err();
        assert!(matches!(err, finchat_core::FinchatError::Serialization { .. }));
    }

    #[test]
    fn test_env_override_wins() {
        let config = apply_env_overrides(ClientConfig::default(), |key| {
            (key == API_URL_ENV).then(|| "http://backend:9000/api".to_string())
        });
        assert_eq!(config.api_base_url, "http://backend:9000/api");

        let untouched = apply_env_overrides(ClientConfig::default(), |_| Some("  ".to_string()));
        assert_eq!(untouched.api_base_url, DEFAULT_API_BASE_URL);
    }
}
