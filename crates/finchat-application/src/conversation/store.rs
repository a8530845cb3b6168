use super::state::{ConversationAction, ConversationState};
use crate::coordinator::IdentitySubscriber;
use crate::generation::IdentityGeneration;
use async_trait::async_trait;
use finchat_core::conversation::{Conversation, HISTORY_TITLE, Message};
use finchat_core::error::{FinchatError, Result};
use finchat_core::gateway::BackendGateway;
use finchat_core::session::{IdentityEvent, UserType};
use finchat_infrastructure::{ConversationStorage, IdentityStorage};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const LOAD_FAILED: &str = "Failed to load conversations";

/// Conversation list of the current identity, cached in memory and written
/// through to the key-value store.
///
/// Writes go to the key of the identity persisted at write time. The session
/// store announces every identity it persists, and the announcement replaces
/// the in-memory list, so the list being written belongs to that identity.
pub struct ConversationStore {
    state: RwLock<ConversationState>,
    identity: IdentityStorage,
    storage: ConversationStorage,
    gateway: Arc<dyn BackendGateway>,
    generation: IdentityGeneration,
}

impl ConversationStore {
    pub fn new(
        identity: IdentityStorage,
        storage: ConversationStorage,
        gateway: Arc<dyn BackendGateway>,
        generation: IdentityGeneration,
    ) -> Self {
        Self {
            state: RwLock::new(ConversationState::default()),
            identity,
            storage,
            gateway,
            generation,
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> ConversationState {
        self.state.read().await.clone()
    }

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.state.read().await.conversations.clone()
    }

    pub async fn current_conversation_id(&self) -> Option<String> {
        self.state.read().await.current_conversation_id.clone()
    }

    pub async fn current_messages(&self) -> Vec<Message> {
        self.state.read().await.current_messages.clone()
    }

    async fn dispatch(&self, action: ConversationAction) {
        self.state.write().await.apply(action);
    }

    /// Applies `action` and writes the resulting list under the current
    /// identity's key. Persistence failures are logged, not returned.
    async fn dispatch_and_persist(&self, action: ConversationAction) {
        let conversations = {
            let mut state = self.state.write().await;
            state.apply(action);
            state.conversations.clone()
        };
        self.persist(&conversations).await;
    }

    async fn persist(&self, conversations: &[Conversation]) {
        let key = match self.current_key().await {
            Ok(key) => key,
            Err(err) => {
                tracing::warn!("Cannot resolve conversation key: {}", err);
                return;
            }
        };
        if let Err(err) = self.storage.write(&key, conversations).await {
            tracing::warn!("Failed to persist conversations under '{}': {}", key, err);
        }
    }

    async fn current_identity(&self) -> Result<(UserType, String)> {
        let user_type = self.identity.user_type().await?;
        let session_id = self.identity.session_id().await?.unwrap_or_default();
        Ok((user_type, session_id))
    }

    async fn current_key(&self) -> Result<String> {
        let (user_type, session_id) = self.current_identity().await?;
        Ok(self.storage.key_for(user_type, &session_id))
    }

    /// Starts the conversation for the active session and selects it.
    ///
    /// The conversation id is the session id. If that conversation already
    /// exists it is re-selected instead of duplicated.
    ///
    /// # Errors
    ///
    /// `NoActiveSession` when no session id is persisted.
    pub async fn create_new_conversation(&self, first_message: Option<&str>) -> Result<String> {
        let session_id = self
            .identity
            .session_id()
            .await?
            .ok_or(FinchatError::NoActiveSession)?;

        let exists = self.state.read().await.find(&session_id).is_some();
        if exists {
            tracing::debug!("Conversation {} exists, selecting it", session_id);
            self.dispatch(ConversationAction::SetCurrent(Some(session_id.clone())))
                .await;
            return Ok(session_id);
        }

        let conversation = Conversation::new(session_id.clone(), first_message);
        tracing::info!("Created conversation {} ('{}')", session_id, conversation.title);
        self.dispatch_and_persist(ConversationAction::AddConversation(conversation))
            .await;
        self.dispatch(ConversationAction::SetCurrent(Some(session_id.clone())))
            .await;
        Ok(session_id)
    }

    /// Selects `id` and loads its messages. Unknown ids select an empty view.
    pub async fn load_conversation(&self, id: &str) {
        self.dispatch(ConversationAction::SetCurrent(Some(id.to_string())))
            .await;
    }

    /// Appends to the working view only; the list entry is updated separately.
    pub async fn append_message(&self, message: Message) {
        self.dispatch(ConversationAction::AddMessage(message)).await;
    }

    pub async fn update_conversation(&self, id: &str, messages: Vec<Message>) {
        self.dispatch_and_persist(ConversationAction::UpdateConversation {
            id: id.to_string(),
            messages,
        })
        .await;
    }

    pub async fn delete_conversation(&self, id: &str) {
        tracing::info!("Deleting conversation {}", id);
        self.dispatch_and_persist(ConversationAction::DeleteConversation(id.to_string()))
            .await;
    }

    /// Empties the in-memory view and list without touching storage.
    pub async fn clear_current(&self) {
        self.dispatch(ConversationAction::ClearCurrent).await;
    }

    pub async fn set_loading(&self, loading: bool) {
        self.dispatch(ConversationAction::SetLoading(loading)).await;
    }

    pub async fn set_error(&self, error: Option<String>) {
        self.dispatch(ConversationAction::SetError(error)).await;
    }

    /// Replaces the list with a single "Previous Conversation" holding
    /// `messages` and selects it.
    pub async fn adopt_history(&self, session_id: &str, messages: Vec<Message>) {
        tracing::info!(
            "Adopting {} message(s) of backend history for {}",
            messages.len(),
            session_id
        );
        let conversation = Conversation::with_messages(session_id, HISTORY_TITLE, messages);
        self.dispatch_and_persist(ConversationAction::SetConversations(vec![conversation]))
            .await;
        self.dispatch(ConversationAction::SetCurrent(Some(session_id.to_string())))
            .await;
    }

    /// Loads the list of the persisted identity.
    ///
    /// Authenticated identities prefer the backend's history and fall back
    /// to local storage. Unreadable storage degrades to an empty list with
    /// a visible error.
    pub async fn hydrate_from_storage(&self) {
        let generation = self.generation.current();
        let (user_type, session_id) = match self.current_identity().await {
            Ok(identity) => identity,
            Err(err) => {
                tracing::warn!("Cannot read identity for hydration: {}", err);
                (UserType::Anonymous, String::new())
            }
        };

        if user_type.is_authenticated() && !session_id.is_empty() {
            match self.gateway.get_conversation_history(&session_id).await {
                Ok(history) if !self.generation.is_current(generation) => {
                    tracing::debug!(
                        "Dropping history of {} ({} message(s)): identity changed",
                        session_id,
                        history.messages.len()
                    );
                    return;
                }
                Ok(history) if !history.messages.is_empty() => {
                    self.adopt_history(&session_id, history.messages).await;
                    return;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(
                        "Remote history for {} unavailable, using local storage: {}",
                        session_id,
                        err
                    );
                }
            }
        }

        let key = self.storage.key_for(user_type, &session_id);
        match self.storage.read(&key).await {
            Ok(conversations) => {
                tracing::debug!("Hydrated {} conversation(s) from '{}'", conversations.len(), key);
                self.dispatch(ConversationAction::SetConversations(conversations))
                    .await;
            }
            Err(err) => {
                tracing::warn!("Failed to load conversations from '{}': {}", key, err);
                self.dispatch(ConversationAction::SetConversations(Vec::new()))
                    .await;
                self.dispatch(ConversationAction::SetError(Some(LOAD_FAILED.to_string())))
                    .await;
            }
        }
        self.dispatch(ConversationAction::SetCurrent(None)).await;
    }
}

#[async_trait]
impl IdentitySubscriber for ConversationStore {
    async fn on_identity_event(&self, event: &IdentityEvent) {
        match event {
            IdentityEvent::Changed {
                session_id,
                history: Some(history),
                ..
            } if !history.is_empty() => {
                self.adopt_history(session_id, history.clone()).await;
            }
            IdentityEvent::Changed { .. } => self.hydrate_from_storage().await,
            IdentityEvent::LoggedOut { .. } => {
                self.clear_current().await;
                self.hydrate_from_storage().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use finchat_core::gateway::{
        AuthResponse, CategoryList, CategoryQuery, CategoryResponse, ChatRequest, ChatResponse,
        ConversationHistory, Credentials, DemoCredentials, DocumentSearchResponse, FileUpload,
        UploadedDocument,
    };
    use finchat_core::session::SessionInfo;
    use finchat_core::storage::KeyValueStore;
    use finchat_infrastructure::{InMemoryKeyValueStore, PersistedIdentity};

    /// Gateway that fails every call; hydration of anonymous identities
    /// never reaches the backend.
    struct OfflineGateway;

    fn offline<T>() -> Result<T> {
        Err(FinchatError::network("offline"))
    }

    #[async_trait]
    impl BackendGateway for OfflineGateway {
        async fn login(&self, _: &Credentials) -> Result<AuthResponse> {
            offline()
        }
        async fn create_anonymous_session(&self) -> Result<AuthResponse> {
            offline()
        }
        async fn get_session(&self) -> Result<SessionInfo> {
            offline()
        }
        async fn logout(&self) -> Result<()> {
            offline()
        }
        async fn get_demo_credentials(&self) -> Result<Option<DemoCredentials>> {
            offline()
        }
        async fn send_message(&self, _: &ChatRequest) -> Result<ChatResponse> {
            offline()
        }
        async fn get_conversation_history(&self, _: &str) -> Result<ConversationHistory> {
            offline()
        }
        async fn clear_conversation(&self, _: &str) -> Result<()> {
            offline()
        }
        async fn ask_by_category(&self, _: &CategoryQuery) -> Result<CategoryResponse> {
            offline()
        }
        async fn get_categories(&self) -> Result<CategoryList> {
            offline()
        }
        async fn upload_file(&self, _: FileUpload) -> Result<UploadedDocument> {
            offline()
        }
        async fn search_documents(&self, _: &str, _: usize) -> Result<DocumentSearchResponse> {
            offline()
        }
        async fn health_check(&self) -> Result<serde_json::Value> {
            offline()
        }
    }

    async fn store_for(kv: &InMemoryKeyValueStore, user_type: UserType) -> ConversationStore {
        let kv: Arc<dyn KeyValueStore> = Arc::new(kv.clone());
        let identity = IdentityStorage::new(kv.clone());
        identity
            .save(&PersistedIdentity {
                token: "token".to_string(),
                session_id: "s-1".to_string(),
                user_type,
            })
            .await
            .unwrap();
        ConversationStore::new(
            identity,
            ConversationStorage::new(kv, "finchat-conversations"),
            Arc::new(OfflineGateway),
            IdentityGeneration::new(),
        )
    }

    #[tokio::test]
    async fn test_create_without_session_fails() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
        let store = ConversationStore::new(
            IdentityStorage::new(kv.clone()),
            ConversationStorage::new(kv, "ns"),
            Arc::new(OfflineGateway),
            IdentityGeneration::new(),
        );

        let err = store.create_new_conversation(Some("hi")).await.unwrap_err();
        assert_eq!(err, FinchatError::NoActiveSession);
        assert!(store.conversations().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_twice_reselects_existing() {
        let kv = InMemoryKeyValueStore::new();
        let store = store_for(&kv, UserType::Anonymous).await;

        let first = store.create_new_conversation(Some("first question")).await.unwrap();
        store.append_message(Message::user("first question")).await;
        store.load_conversation("elsewhere").await;
        let second = store.create_new_conversation(Some("other")).await.unwrap();

        assert_eq!(first, "s-1");
        assert_eq!(first, second);
        let conversations = store.conversations().await;
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].title, "first question");
        assert_eq!(store.current_conversation_id().await.as_deref(), Some("s-1"));
    }

    #[tokio::test]
    async fn test_authenticated_hydration_falls_back_to_storage() {
        let kv = InMemoryKeyValueStore::new();
        let store = store_for(&kv, UserType::Authenticated).await;
        store.create_new_conversation(Some("saved")).await.unwrap();

        let reloaded = store_for(&kv, UserType::Authenticated).await;
        reloaded.hydrate_from_storage().await;

        let state = reloaded.state().await;
        assert_eq!(state.conversations.len(), 1);
        assert_eq!(state.conversations[0].title, "saved");
        assert!(state.current_conversation_id.is_none());
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_clear_current_keeps_storage() {
        let kv = InMemoryKeyValueStore::new();
        let store = store_for(&kv, UserType::Anonymous).await;
        store.create_new_conversation(Some("keep me")).await.unwrap();

        store.clear_current().await;
        assert!(store.conversations().await.is_empty());

        store.hydrate_from_storage().await;
        assert_eq!(store.conversations().await.len(), 1);
    }
}
