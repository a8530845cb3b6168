//! Shared fixtures: an in-memory backend double and client builders.

#![allow(dead_code)]

use async_trait::async_trait;
use finchat_application::ChatClient;
use finchat_core::conversation::Message;
use finchat_core::error::{FinchatError, Result};
use finchat_core::gateway::{
    AuthResponse, BackendGateway, Category, CategoryList, CategoryQuery, CategoryResponse,
    ChatRequest, ChatResponse, ConversationHistory, Credentials, DemoCredentials,
    DocumentSearchResponse, FileUpload, UploadedDocument,
};
use finchat_core::session::{SessionInfo, UserType};
use finchat_core::storage::KeyValueStore;
use finchat_infrastructure::{IdentityStorage, InMemoryKeyValueStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub const NAMESPACE: &str = "finchat-conversations";
pub const DEMO_EMAIL: &str = "demo@finchat.example";
pub const DEMO_PASSWORD: &str = "demo123";

/// Backend double with the same bearer-token semantics as the HTTP gateway:
/// every call reads the token from identity storage.
pub struct MockGateway {
    identity: IdentityStorage,
    accounts: HashMap<String, String>,
    sessions: Mutex<HashMap<String, SessionInfo>>,
    next_id: AtomicUsize,
    pub anonymous_created: AtomicUsize,
    pub logins: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub fail_anonymous: AtomicBool,
    pub fail_get_session: AtomicBool,
    pub fail_logout: AtomicBool,
    pub fail_send: AtomicBool,
    pub fail_categories: AtomicBool,
    pub login_history: Mutex<Option<Vec<Message>>>,
    pub histories: Mutex<HashMap<String, Vec<Message>>>,
    pub sent: Mutex<Vec<ChatRequest>>,
    pub category_queries: Mutex<Vec<CategoryQuery>>,
    pub cleared: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<FileUpload>>,
    send_gate: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
}

impl MockGateway {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(DEMO_EMAIL.to_string(), DEMO_PASSWORD.to_string());
        accounts.insert("a@b.com".to_string(), "pw".to_string());

        Self {
            identity: IdentityStorage::new(store),
            accounts,
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            anonymous_created: AtomicUsize::new(0),
            logins: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            fail_anonymous: AtomicBool::new(false),
            fail_get_session: AtomicBool::new(false),
            fail_logout: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
            fail_categories: AtomicBool::new(false),
            login_history: Mutex::new(None),
            histories: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            category_queries: Mutex::new(Vec::new()),
            cleared: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            send_gate: tokio::sync::Mutex::new(None),
        }
    }

    /// Forgets every issued token, as if all sessions expired server-side.
    pub fn expire_all(&self) {
        self.sessions.lock().unwrap().clear();
    }

    /// Holds the next `send_message` until the returned sender fires.
    pub async fn hold_next_send(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.send_gate.lock().await = Some(rx);
        tx
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    fn issue(&self, user_type: UserType, email: Option<String>) -> AuthResponse {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let token = format!("token-{n}");
        let session_id = format!("session-{n}");
        let info = SessionInfo {
            session_id: session_id.clone(),
            user_type,
            is_authenticated: user_type.is_authenticated(),
            email,
            conversation_count: 0,
            session_duration: "0:00:00".to_string(),
            last_activity: "2024-01-01T00:00:00".to_string(),
            created_at: "2024-01-01T00:00:00".to_string(),
        };
        self.sessions.lock().unwrap().insert(token.clone(), info);

        AuthResponse {
            success: true,
            session_id,
            token,
            user_type,
            message: String::new(),
            history: None,
        }
    }

    async fn current_session(&self) -> Option<SessionInfo> {
        let token = self.identity.token().await.ok().flatten()?;
        self.sessions.lock().unwrap().get(&token).cloned()
    }
}

#[async_trait]
impl BackendGateway for MockGateway {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        match self.accounts.get(&credentials.email) {
            Some(password) if *password == credentials.password => {
                self.logins.fetch_add(1, Ordering::SeqCst);
                let mut auth = self.issue(UserType::Authenticated, Some(credentials.email.clone()));
                auth.history = self.login_history.lock().unwrap().clone();
                Ok(auth)
            }
            _ => Err(FinchatError::auth("Invalid credentials")),
        }
    }

    async fn create_anonymous_session(&self) -> Result<AuthResponse> {
        if self.fail_anonymous.load(Ordering::SeqCst) {
            return Err(FinchatError::network("connection refused"));
        }
        self.anonymous_created.fetch_add(1, Ordering::SeqCst);
        Ok(self.issue(UserType::Anonymous, None))
    }

    async fn get_session(&self) -> Result<SessionInfo> {
        if self.fail_get_session.load(Ordering::SeqCst) {
            return Err(FinchatError::http(502, "Bad Gateway"));
        }
        self.current_session()
            .await
            .ok_or_else(|| FinchatError::SessionExpired("Invalid or expired session".to_string()))
    }

    async fn logout(&self) -> Result<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(FinchatError::network("connection reset"));
        }
        if let Some(token) = self.identity.token().await? {
            self.sessions.lock().unwrap().remove(&token);
        }
        Ok(())
    }

    async fn get_demo_credentials(&self) -> Result<Option<DemoCredentials>> {
        Ok(Some(DemoCredentials {
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
            note: "Demo account for testing".to_string(),
            anonymous_option: String::new(),
            accounts: Vec::new(),
        }))
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.sent.lock().unwrap().push(request.clone());

        let gate = self.send_gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.fail_send.load(Ordering::SeqCst) {
            return Err(FinchatError::http(500, "Internal Server Error"));
        }

        Ok(ChatResponse {
            response: format!("Answer to: {}", request.message),
            conversation_id: request.conversation_id.clone().unwrap_or_default(),
            sources: Some(vec!["faq/general.md".to_string()]),
            confidence_score: None,
            category: None,
            related_categories: None,
        })
    }

    async fn get_conversation_history(&self, conversation_id: &str) -> Result<ConversationHistory> {
        let messages = self
            .histories
            .lock()
            .unwrap()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default();
        Ok(ConversationHistory { messages })
    }

    async fn clear_conversation(&self, conversation_id: &str) -> Result<()> {
        self.cleared.lock().unwrap().push(conversation_id.to_string());
        Ok(())
    }

    async fn ask_by_category(&self, query: &CategoryQuery) -> Result<CategoryResponse> {
        self.category_queries.lock().unwrap().push(query.clone());
        Ok(CategoryResponse {
            answer: format!("{} answer", query.category),
            category: query.category.clone(),
            confidence_score: 0.87,
            sources: vec!["faq/fees.md#1".to_string()],
            related_categories: vec!["accounts".to_string(), "cards".to_string()],
            session_id: query.session_id.clone().unwrap_or_default(),
        })
    }

    async fn get_categories(&self) -> Result<CategoryList> {
        if self.fail_categories.load(Ordering::SeqCst) {
            return Err(FinchatError::http(503, "Service Unavailable"));
        }
        Ok(CategoryList {
            categories: vec![
                Category {
                    name: "fees".to_string(),
                    description: "Account and transfer fees".to_string(),
                },
                Category {
                    name: "security".to_string(),
                    description: "Fraud and account security".to_string(),
                },
            ],
            total_categories: 2,
        })
    }

    async fn upload_file(&self, upload: FileUpload) -> Result<UploadedDocument> {
        let document = UploadedDocument {
            document_id: Some("doc-1".to_string()),
            title: upload.title.clone().or_else(|| Some(upload.file_name.clone())),
            message: Some("Document uploaded".to_string()),
            extra: serde_json::Map::new(),
        };
        self.uploads.lock().unwrap().push(upload);
        Ok(document)
    }

    async fn search_documents(&self, query: &str, _top_k: usize) -> Result<DocumentSearchResponse> {
        Ok(DocumentSearchResponse {
            query: query.to_string(),
            results: Vec::new(),
            count: 0,
        })
    }

    async fn health_check(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({ "status": "healthy" }))
    }
}

/// Key-value store that can be told to reject writes to one key.
#[derive(Clone)]
pub struct FlakyStore {
    inner: InMemoryKeyValueStore,
    failing_key: Arc<Mutex<Option<String>>>,
}

impl FlakyStore {
    fn check(&self, key: &str) -> Result<()> {
        match self.failing_key.lock().unwrap().as_deref() {
            Some(failing) if failing == key => Err(FinchatError::io(format!("disk full writing {key}"))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check(key)?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key).await
    }
}

/// One "browser": a key-value store plus a backend double bound to it.
pub struct Harness {
    pub kv: InMemoryKeyValueStore,
    pub gateway: Arc<MockGateway>,
    failing_key: Arc<Mutex<Option<String>>>,
}

impl Harness {
    pub fn new() -> Self {
        let kv = InMemoryKeyValueStore::new();
        let gateway = Arc::new(MockGateway::new(Arc::new(kv.clone())));
        Self {
            kv,
            gateway,
            failing_key: Arc::new(Mutex::new(None)),
        }
    }

    /// A fresh client over the same storage, as after a page reload.
    pub async fn client(&self) -> ChatClient {
        let store = FlakyStore {
            inner: self.kv.clone(),
            failing_key: self.failing_key.clone(),
        };
        ChatClient::new(Arc::new(store), self.gateway.clone(), NAMESPACE).await
    }

    /// Makes every client of this harness fail writes to `key`.
    pub fn fail_writes_to(&self, key: Option<&str>) {
        *self.failing_key.lock().unwrap() = key.map(String::from);
    }

    pub fn identity(&self) -> IdentityStorage {
        IdentityStorage::new(Arc::new(self.kv.clone()))
    }

    pub fn anonymous_created(&self) -> usize {
        self.gateway.anonymous_created.load(Ordering::SeqCst)
    }

    /// Raw conversation list JSON stored under `key`.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.kv.get(key).await.unwrap()
    }
}
