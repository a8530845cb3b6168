//! Error types for the FinChat client.

use thiserror::Error;

/// A shared error type for the entire FinChat client.
///
/// The first group of variants is the failure taxonomy the stores act on
/// (network, auth, expired session, missing session, corrupt storage); the
/// rest are ambient failures with automatic conversion via `From`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FinchatError {
    /// The request never completed (connection refused, timeout, DNS, ...)
    #[error("Network error: {message}")]
    Network { message: String },

    /// The backend answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Invalid credentials or a 401 from the backend
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A stored token was rejected while fetching session info
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// A conversation was requested while no session id is persisted
    #[error("No active session")]
    NoActiveSession,

    /// Persisted data under `key` could not be parsed
    #[error("Corrupt storage entry '{key}': {message}")]
    StorageCorrupt { key: String, message: String },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FinchatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an Http error
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates an Auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates a StorageCorrupt error
    pub fn storage_corrupt(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StorageCorrupt {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if the request never reached the backend or the backend failed
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Http { .. })
    }

    /// Check if this is an authentication failure
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Check if this is a SessionExpired error
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired(_))
    }

    /// Check if this is a StorageCorrupt error
    pub fn is_storage_corrupt(&self) -> bool {
        matches!(self, Self::StorageCorrupt { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FinchatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FinchatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FinchatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for FinchatError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for FinchatError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status == reqwest::StatusCode::UNAUTHORIZED => {
                Self::Auth(err.to_string())
            }
            Some(status) => Self::http(status.as_u16(), err.to_string()),
            None if err.is_decode() => Self::Serialization {
                format: "JSON".to_string(),
                message: err.to_string(),
            },
            None => Self::network(err.to_string()),
        }
    }
}

/// Conversion from String (for error messages)
impl From<String> for FinchatError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, FinchatError>`.
pub type Result<T> = std::result::Result<T, FinchatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_predicate_covers_http_failures() {
        assert!(FinchatError::network("refused").is_network());
        assert!(FinchatError::http(502, "bad gateway").is_network());
        assert!(!FinchatError::auth("nope").is_network());
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let err: FinchatError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
        assert!(matches!(err, FinchatError::Serialization { ref format, .. } if format == "JSON"));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(FinchatError::NoActiveSession.to_string(), "No active session");
        assert_eq!(
            FinchatError::storage_corrupt("k", "eof").to_string(),
            "Corrupt storage entry 'k': eof"
        );
    }
}
