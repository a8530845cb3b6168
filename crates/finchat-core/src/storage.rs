//! Key-value storage port.
//!
//! Both stores persist through this trait instead of reaching a process-wide
//! singleton, so tests can inject an in-memory double.

use crate::error::Result;
use crate::session::UserType;
use async_trait::async_trait;

/// Storage key of the bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Storage key of the server-issued session id.
pub const SESSION_ID_KEY: &str = "session_id";
/// Storage key of the persisted user type (`anonymous` / `authenticated`).
pub const USER_TYPE_KEY: &str = "user_type";
/// Storage key of the "has visited before" marker.
pub const USER_VISITED_KEY: &str = "user_visited";

/// Durable string-to-string storage, the equivalent of browser local storage.
///
/// Implementations give last-write-wins semantics and nothing stronger.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Builds the conversation-list key for an identity:
/// `"<namespace>-<user_type>-<session_id>"`.
pub fn conversation_key(namespace: &str, user_type: UserType, session_id: &str) -> String {
    format!("{}-{}-{}", namespace, user_type, session_id)
}
