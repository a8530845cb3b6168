//! Wire types of the backend contract (snake_case JSON).

use crate::conversation::Message;
use crate::session::UserType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login request body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response of the login and anonymous-session endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default)]
    pub message: String,
    /// Prior conversation of the account, returned by some backends on login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Message>>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub related_categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryQuery {
    pub question: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub answer: String,
    pub category: String,
    pub confidence_score: f64,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub related_categories: Vec<String>,
    #[serde(default)]
    pub session_id: String,
}

impl From<CategoryResponse> for ChatResponse {
    fn from(answer: CategoryResponse) -> Self {
        ChatResponse {
            response: answer.answer,
            conversation_id: answer.session_id,
            sources: Some(answer.sources),
            confidence_score: Some(answer.confidence_score),
            category: Some(answer.category),
            related_categories: Some(answer.related_categories),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryList {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub total_categories: usize,
}

/// A local file to be sent as multipart form data.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub title: Option<String>,
}

/// Metadata the backend returns for an uploaded document.
///
/// Only the commonly returned fields are typed; the rest is kept verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UploadedDocument {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSearchResult {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSearchResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub results: Vec<DocumentSearchResult>,
    #[serde(default)]
    pub count: usize,
}
