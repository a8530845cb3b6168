//! ChatClient - composition root of the application layer.

use crate::chat_service::ChatService;
use crate::conversation::ConversationStore;
use crate::coordinator::SessionCoordinator;
use crate::generation::IdentityGeneration;
use crate::session::{SessionState, SessionStore};
use finchat_core::config::ClientConfig;
use finchat_core::error::Result;
use finchat_core::gateway::BackendGateway;
use finchat_core::storage::KeyValueStore;
use finchat_infrastructure::{ConversationStorage, FileKeyValueStore, FinchatPaths, IdentityStorage};
use finchat_interaction::HttpBackendGateway;
use std::sync::Arc;

/// Owns the session store, the conversation store and the chat service,
/// sharing one storage backend, one gateway and one identity generation.
pub struct ChatClient {
    session: Arc<SessionStore>,
    conversations: Arc<ConversationStore>,
    chat: ChatService,
    identity: IdentityStorage,
    gateway: Arc<dyn BackendGateway>,
}

impl ChatClient {
    /// Wires the stores and subscribes the conversation store to identity
    /// events.
    pub async fn new(
        store: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn BackendGateway>,
        storage_namespace: &str,
    ) -> Self {
        let identity = IdentityStorage::new(store.clone());
        let generation = IdentityGeneration::new();
        let coordinator = Arc::new(SessionCoordinator::new());

        let conversations = Arc::new(ConversationStore::new(
            identity.clone(),
            ConversationStorage::new(store, storage_namespace),
            gateway.clone(),
            generation.clone(),
        ));
        coordinator.subscribe(conversations.clone()).await;

        let session = Arc::new(SessionStore::new(
            gateway.clone(),
            identity.clone(),
            coordinator,
            generation.clone(),
        ));
        let chat = ChatService::new(conversations.clone(), gateway.clone(), generation);

        Self {
            session,
            conversations,
            chat,
            identity,
            gateway,
        }
    }

    /// Builds a client over the persistent key-value file and the HTTP
    /// gateway described by `config`.
    pub async fn from_config(config: &ClientConfig) -> Result<Self> {
        let path = FinchatPaths::storage_file(config.storage_dir.as_ref())?;
        tracing::debug!("Using storage file {}", path.display());
        let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::open(path).await?);

        let gateway = HttpBackendGateway::new(config, IdentityStorage::new(store.clone()))?;
        Ok(Self::new(store, Arc::new(gateway), &config.storage_namespace).await)
    }

    /// Initializes the session, then hydrates conversations for the
    /// resulting identity.
    ///
    /// Hydration never runs against an identity that is still being
    /// resolved. When initialization itself announced a new identity the
    /// conversation store has already hydrated and is left alone.
    pub async fn bootstrap(&self) -> Result<SessionState> {
        let before = self.session.generation().current();
        let state = self.session.initialize().await?;
        if self.session.generation().is_current(before) {
            self.conversations.hydrate_from_storage().await;
        }
        Ok(state)
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn chat(&self) -> &ChatService {
        &self.chat
    }

    pub fn identity(&self) -> &IdentityStorage {
        &self.identity
    }

    /// Direct backend access for calls that need no store bookkeeping.
    pub fn gateway(&self) -> &Arc<dyn BackendGateway> {
        &self.gateway
    }
}
