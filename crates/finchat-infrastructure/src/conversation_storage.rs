//! Per-identity conversation persistence.
//!
//! Conversation lists are stored as JSON under
//! `"<namespace>-<user_type>-<session_id>"`. Writes replace the whole list
//! (last write wins); the stores call [`ConversationStorage::write`] after
//! every list mutation, which makes this a write-through cache.

use finchat_core::conversation::Conversation;
use finchat_core::error::{FinchatError, Result};
use finchat_core::session::UserType;
use finchat_core::storage::{KeyValueStore, conversation_key};
use std::sync::Arc;

#[derive(Clone)]
pub struct ConversationStorage {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl ConversationStorage {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    /// Storage key for an identity.
    pub fn key_for(&self, user_type: UserType, session_id: &str) -> String {
        conversation_key(&self.namespace, user_type, session_id)
    }

    /// Reads the list stored under `key`; an absent key reads as empty.
    ///
    /// # Errors
    ///
    /// `StorageCorrupt` if the stored value is not a conversation list.
    pub async fn read(&self, key: &str) -> Result<Vec<Conversation>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).map_err(|e| {
            tracing::warn!("Conversation list under '{}' is unreadable: {}", key, e);
            FinchatError::storage_corrupt(key, e.to_string())
        })
    }

    /// Replaces the list stored under `key`.
    pub async fn write(&self, key: &str, conversations: &[Conversation]) -> Result<()> {
        let raw = serde_json::to_string(conversations)?;
        self.store.set(key, &raw).await?;
        tracing::debug!("Persisted {} conversation(s) under '{}'", conversations.len(), key);
        Ok(())
    }
}
