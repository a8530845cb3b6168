//! Persisted identity keys.
//!
//! Token and session id are written together and read together: a half
//! written identity (one key without the other) reads back as absent.

use finchat_core::error::Result;
use finchat_core::session::UserType;
use finchat_core::storage::{
    AUTH_TOKEN_KEY, KeyValueStore, SESSION_ID_KEY, USER_TYPE_KEY, USER_VISITED_KEY,
};
use std::sync::Arc;

/// The identity the client persists between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedIdentity {
    pub token: String,
    pub session_id: String,
    pub user_type: UserType,
}

/// Typed access to the identity keys of a [`KeyValueStore`].
#[derive(Clone)]
pub struct IdentityStorage {
    store: Arc<dyn KeyValueStore>,
}

impl IdentityStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads the full identity, or `None` unless both token and session id
    /// are present.
    pub async fn load(&self) -> Result<Option<PersistedIdentity>> {
        let token = self.token().await?;
        let session_id = self.session_id().await?;
        match (token, session_id) {
            (Some(token), Some(session_id)) => Ok(Some(PersistedIdentity {
                token,
                session_id,
                user_type: self.user_type().await?,
            })),
            _ => Ok(None),
        }
    }

    pub async fn token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(AUTH_TOKEN_KEY)
            .await?
            .filter(|t| !t.is_empty()))
    }

    pub async fn session_id(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(SESSION_ID_KEY)
            .await?
            .filter(|s| !s.is_empty()))
    }

    /// The persisted user type; `anonymous` when unset.
    pub async fn user_type(&self) -> Result<UserType> {
        Ok(self
            .store
            .get(USER_TYPE_KEY)
            .await?
            .map(UserType::from)
            .unwrap_or_default())
    }

    pub async fn has_visited(&self) -> Result<bool> {
        Ok(self.store.get(USER_VISITED_KEY).await?.is_some())
    }

    /// Persists a new identity and marks the client as visited.
    pub async fn save(&self, identity: &PersistedIdentity) -> Result<()> {
        self.store.set(AUTH_TOKEN_KEY, &identity.token).await?;
        self.store.set(SESSION_ID_KEY, &identity.session_id).await?;
        self.store
            .set(USER_TYPE_KEY, identity.user_type.as_str())
            .await?;
        self.store.set(USER_VISITED_KEY, "true").await?;
        Ok(())
    }

    /// Updates session id and user type after the backend reported them,
    /// keeping the current token.
    pub async fn refresh(&self, session_id: &str, user_type: UserType) -> Result<()> {
        self.store.set(SESSION_ID_KEY, session_id).await?;
        self.store.set(USER_TYPE_KEY, user_type.as_str()).await
    }

    /// Removes every identity key.
    pub async fn clear(&self) -> Result<()> {
        for key in [AUTH_TOKEN_KEY, SESSION_ID_KEY, USER_TYPE_KEY, USER_VISITED_KEY] {
            self.store.remove(key).await?;
        }
        Ok(())
    }
}
