//! Backend gateway port.
//!
//! Defines the request/response contract with the FAQ backend. The HTTP
//! implementation lives in `finchat-interaction`; the stores only see this
//! trait.

mod demo;
mod dto;

pub use demo::{DemoAccount, DemoCredentials, DemoCredentialsResponse};
pub use dto::{
    AuthResponse, Category, CategoryList, CategoryQuery, CategoryResponse, ChatRequest,
    ChatResponse, ConversationHistory, Credentials, DocumentSearchResponse, DocumentSearchResult,
    FileUpload, UploadedDocument,
};

use crate::error::Result;
use crate::session::SessionInfo;
use async_trait::async_trait;

/// Stateless request/response access to the FAQ backend.
///
/// Every method is a single round trip. Failures are reported as errors with
/// no partial results; implementations attach the persisted bearer token to
/// every request when one exists.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Exchanges credentials for an authenticated session.
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse>;

    /// Requests a fresh anonymous session and token.
    async fn create_anonymous_session(&self) -> Result<AuthResponse>;

    /// Fetches metadata of the session identified by the bearer token.
    ///
    /// A rejected token is reported as [`crate::FinchatError::SessionExpired`].
    async fn get_session(&self) -> Result<SessionInfo>;

    /// Invalidates the current token server-side.
    async fn logout(&self) -> Result<()>;

    /// Fetches demo login credentials, normalized from either response shape.
    ///
    /// Returns `Ok(None)` when the payload carries no usable account.
    async fn get_demo_credentials(&self) -> Result<Option<DemoCredentials>>;

    /// Sends a general chat message.
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Fetches the server-side message history of a conversation.
    async fn get_conversation_history(&self, conversation_id: &str) -> Result<ConversationHistory>;

    /// Deletes the server-side history of a conversation.
    async fn clear_conversation(&self, conversation_id: &str) -> Result<()>;

    /// Answers a question scoped to one FAQ category.
    async fn ask_by_category(&self, query: &CategoryQuery) -> Result<CategoryResponse>;

    /// Lists the FAQ categories available for routing.
    async fn get_categories(&self) -> Result<CategoryList>;

    /// Uploads a document into the retrieval index.
    async fn upload_file(&self, upload: FileUpload) -> Result<UploadedDocument>;

    /// Runs a similarity search over indexed documents.
    async fn search_documents(&self, query: &str, top_k: usize) -> Result<DocumentSearchResponse>;

    /// Backend liveness check.
    async fn health_check(&self) -> Result<serde_json::Value>;
}
