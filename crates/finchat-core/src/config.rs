//! Client configuration model.
//!
//! Loading lives in `finchat-infrastructure::config_storage`; this module only
//! defines the shape and its defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default backend base URL used when neither the config file nor the
/// environment provides one.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Default prefix of every persisted conversation-list key.
pub const DEFAULT_STORAGE_NAMESPACE: &str = "finchat-conversations";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the FAQ backend, without trailing slash.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Prefix for `<namespace>-<user_type>-<session_id>` storage keys.
    #[serde(default = "default_storage_namespace")]
    pub storage_namespace: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Directory holding the persistent key-value file. `None` means the
    /// platform data directory.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            storage_namespace: default_storage_namespace(),
            request_timeout_secs: default_request_timeout_secs(),
            storage_dir: None,
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_storage_namespace() -> String {
    DEFAULT_STORAGE_NAMESPACE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
