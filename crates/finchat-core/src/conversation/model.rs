//! Conversation domain model.

use super::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when a conversation is created without a first message.
pub const DEFAULT_TITLE: &str = "New Conversation";
/// Title of a conversation reconstructed from backend history.
pub const HISTORY_TITLE: &str = "Previous Conversation";
/// Titles longer than this many characters are truncated.
pub const MAX_TITLE_CHARS: usize = 50;

/// A named, ordered thread of messages.
///
/// `id` equals the owning session's id: one live conversation per identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    /// Chronological order; index order is insertion order.
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    /// Never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Creates an empty conversation titled after `first_message`.
    pub fn new(id: impl Into<String>, first_message: Option<&str>) -> Self {
        Self::with_messages(id, derive_title(first_message), Vec::new())
    }

    pub fn with_messages(
        id: impl Into<String>,
        title: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            messages,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the message sequence and bumps `updated_at`.
    pub fn replace_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.updated_at = Utc::now().max(self.created_at);
    }
}

/// Derives a conversation title from the first user message.
///
/// Messages up to [`MAX_TITLE_CHARS`] characters are used verbatim; longer
/// ones are cut at that many characters and suffixed with `...`.
pub fn derive_title(first_message: Option<&str>) -> String {
    match first_message {
        Some(text) if !text.is_empty() => {
            if text.chars().count() > MAX_TITLE_CHARS {
                let head: String = text.chars().take(MAX_TITLE_CHARS).collect();
                format!("{}...", head)
            } else {
                text.to_string()
            }
        }
        _ => DEFAULT_TITLE.to_string(),
    }
}
