//! ChatService - sends user turns and folds answers into the conversation.

use crate::conversation::ConversationStore;
use crate::generation::IdentityGeneration;
use finchat_core::conversation::Message;
use finchat_core::error::{FinchatError, Result};
use finchat_core::gateway::{
    BackendGateway, Category, CategoryQuery, ChatRequest, ChatResponse, FileUpload,
    UploadedDocument,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const SEND_FAILED: &str = "Failed to send message. Please try again.";
pub const CATEGORIES_FAILED: &str = "Failed to get categories. Please try again.";

/// Result of [`ChatService::send_message`].
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The assistant's answer, already appended to the conversation.
    Answered(Message),
    /// The identity changed while the request was in flight; the answer was
    /// dropped.
    Discarded,
}

pub struct ChatService {
    conversations: Arc<ConversationStore>,
    gateway: Arc<dyn BackendGateway>,
    generation: IdentityGeneration,
    selected_category: RwLock<Option<String>>,
    categories: RwLock<Vec<Category>>,
    /// Citations of assistant turns, keyed by message timestamp.
    source_index: RwLock<HashMap<String, Vec<String>>>,
}

impl ChatService {
    pub fn new(
        conversations: Arc<ConversationStore>,
        gateway: Arc<dyn BackendGateway>,
        generation: IdentityGeneration,
    ) -> Self {
        Self {
            conversations,
            gateway,
            generation,
            selected_category: RwLock::new(None),
            categories: RwLock::new(Vec::new()),
            source_index: RwLock::new(HashMap::new()),
        }
    }

    /// Sends one user turn.
    ///
    /// Creates the session's conversation if none is selected, appends the
    /// user message immediately and the answer once it arrives. On failure
    /// the user message stays and the store shows an error.
    pub async fn send_message(&self, text: &str) -> Result<SendOutcome> {
        self.conversations.set_error(None).await;
        self.conversations.set_loading(true).await;

        let outcome = self.exchange(text).await;

        self.conversations.set_loading(false).await;
        if let Err(err) = &outcome {
            tracing::error!("Failed to send message: {}", err);
            self.conversations
                .set_error(Some(SEND_FAILED.to_string()))
                .await;
        }
        outcome
    }

    async fn exchange(&self, text: &str) -> Result<SendOutcome> {
        let generation = self.generation.current();

        let conversation_id = match self.conversations.current_conversation_id().await {
            Some(id) => id,
            None => self.conversations.create_new_conversation(Some(text)).await?,
        };
        self.conversations.append_message(Message::user(text)).await;

        let category = self.selected_category.read().await.clone();
        let response: ChatResponse = match category {
            Some(category) => {
                tracing::debug!("Routing question to category '{}'", category);
                self.gateway
                    .ask_by_category(&CategoryQuery {
                        question: text.to_string(),
                        category,
                        session_id: Some(conversation_id.clone()),
                    })
                    .await?
                    .into()
            }
            None => {
                self.gateway
                    .send_message(&ChatRequest {
                        message: text.to_string(),
                        conversation_id: Some(conversation_id.clone()),
                    })
                    .await?
            }
        };

        if !self.generation.is_current(generation) {
            tracing::info!(
                "Discarding answer for {}: identity changed while it was in flight",
                conversation_id
            );
            return Ok(SendOutcome::Discarded);
        }

        let assistant = Message::assistant(format_answer(&response))
            .with_sources(response.sources.clone().unwrap_or_default())
            .with_routing(response.category.clone(), response.confidence_score);
        if let Some(sources) = &assistant.sources {
            self.source_index
                .write()
                .await
                .insert(assistant.timestamp.clone(), sources.clone());
        }

        self.conversations.append_message(assistant.clone()).await;
        let messages = self.conversations.current_messages().await;
        self.conversations
            .update_conversation(&conversation_id, messages)
            .await;

        Ok(SendOutcome::Answered(assistant))
    }

    /// Toggles the category filter: selecting the active category clears it.
    /// Returns the selection now in effect.
    pub async fn select_category(&self, name: &str) -> Option<String> {
        let mut selected = self.selected_category.write().await;
        let next = match selected.as_deref() {
            Some(current) if current == name => None,
            _ => Some(name.to_string()),
        };
        *selected = next.clone();
        next
    }

    pub async fn selected_category(&self) -> Option<String> {
        self.selected_category.read().await.clone()
    }

    /// Fetches and caches the FAQ categories.
    pub async fn load_categories(&self) -> Result<Vec<Category>> {
        match self.gateway.get_categories().await {
            Ok(list) => {
                tracing::debug!("Loaded {} categories", list.categories.len());
                *self.categories.write().await = list.categories.clone();
                Ok(list.categories)
            }
            Err(err) => {
                tracing::error!("Failed to load categories: {}", err);
                self.conversations
                    .set_error(Some(CATEGORIES_FAILED.to_string()))
                    .await;
                Err(err)
            }
        }
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.categories.read().await.clone()
    }

    /// Reads `path` and uploads it to the document index.
    pub async fn upload_document(
        &self,
        path: &Path,
        title: Option<String>,
    ) -> Result<UploadedDocument> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| FinchatError::io(format!("Not a file path: {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        tracing::info!("Uploading {} ({} bytes)", file_name, bytes.len());

        self.gateway
            .upload_file(FileUpload {
                file_name,
                bytes,
                content_type: None,
                title,
            })
            .await
    }

    /// Deletes a conversation locally and asks the backend to forget it.
    /// Backend failures are logged only.
    pub async fn delete_conversation(&self, id: &str) {
        self.conversations.delete_conversation(id).await;
        if let Err(err) = self.gateway.clear_conversation(id).await {
            tracing::warn!("Backend kept conversation {}: {}", id, err);
        }
    }

    pub async fn sources_for(&self, timestamp: &str) -> Option<Vec<String>> {
        self.source_index.read().await.get(timestamp).cloned()
    }

    pub async fn source_index(&self) -> HashMap<String, Vec<String>> {
        self.source_index.read().await.clone()
    }
}

/// Renders the assistant turn, appending routing annotations when the
/// backend reported a confidence score.
pub fn format_answer(response: &ChatResponse) -> String {
    let mut content = response.response.clone();

    if let Some(confidence) = response.confidence_score {
        let category = response.category.as_deref().unwrap_or("general");
        content.push_str(&format!(
            "\n\n*Category: {} (Confidence: {:.0}%)*",
            category,
            (confidence * 100.0).round()
        ));

        if let Some(related) = response.related_categories.as_ref().filter(|r| !r.is_empty()) {
            content.push_str(&format!("\n*Related: {}*", related.join(", ")));
        }
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(confidence: Option<f64>, related: Option<Vec<&str>>) -> ChatResponse {
        ChatResponse {
            response: "Fees are waived.".to_string(),
            conversation_id: "s-1".to_string(),
            sources: None,
            confidence_score: confidence,
            category: Some("fees".to_string()),
            related_categories: related.map(|r| r.into_iter().map(String::from).collect()),
        }
    }

    #[test]
    fn test_plain_answer_is_unchanged() {
        assert_eq!(format_answer(&response(None, None)), "Fees are waived.");
    }

    #[test]
    fn test_routed_answer_annotations() {
        assert_eq!(
            format_answer(&response(Some(0.876), Some(vec!["accounts", "cards"]))),
            "Fees are waived.\n\n*Category: fees (Confidence: 88%)*\n*Related: accounts, cards*"
        );
        assert_eq!(
            format_answer(&response(Some(0.5), Some(vec![]))),
            "Fees are waived.\n\n*Category: fees (Confidence: 50%)*"
        );
    }
}
