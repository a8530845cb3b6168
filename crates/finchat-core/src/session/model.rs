//! Identity models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the current identity is a guest or a credentialed user.
///
/// The backend may report richer user types (roles); anything other than
/// `anonymous` is treated as authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum UserType {
    #[default]
    Anonymous,
    Authenticated,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Anonymous => "anonymous",
            UserType::Authenticated => "authenticated",
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, UserType::Authenticated)
    }
}

impl From<&str> for UserType {
    fn from(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("anonymous") {
            UserType::Anonymous
        } else {
            UserType::Authenticated
        }
    }
}

impl From<String> for UserType {
    fn from(value: String) -> Self {
        UserType::from(value.as_str())
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session metadata as reported by the backend's session endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub user_type: UserType,
    /// Present iff the session is authenticated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub conversation_count: u32,
    /// Human-readable duration string, as formatted by the backend.
    #[serde(default)]
    pub session_duration: String,
    #[serde(default)]
    pub last_activity: String,
    #[serde(default)]
    pub created_at: String,
}

/// The identity the client is currently acting as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_type: UserType,
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_parsing_is_lenient() {
        assert_eq!(UserType::from("anonymous"), UserType::Anonymous);
        assert_eq!(UserType::from("authenticated"), UserType::Authenticated);
        assert_eq!(UserType::from("admin"), UserType::Authenticated);
    }

    #[test]
    fn test_session_info_accepts_minimal_payload() {
        let info: SessionInfo =
            serde_json::from_str(r#"{"session_id":"abc","user_type":"anonymous"}"#).unwrap();
        assert_eq!(info.session_id, "abc");
        assert_eq!(info.user_type, UserType::Anonymous);
        assert!(info.email.is_none());
        assert_eq!(info.conversation_count, 0);
    }

    #[test]
    fn test_user_type_serializes_lowercase() {
        let json = serde_json::to_string(&UserType::Authenticated).unwrap();
        assert_eq!(json, r#""authenticated""#);
    }
}
