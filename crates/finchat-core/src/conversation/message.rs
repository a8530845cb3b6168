//! Chat turn types.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the FAQ assistant.
    Assistant,
}

/// A single message in a conversation.
///
/// Assistant turns carry markdown content and, when answered through
/// retrieval or category routing, the citations and routing annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// Creation time (ISO 8601), set client-side. History returned by the
    /// backend may omit it.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Message {
    /// A user turn stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// An assistant turn stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now().to_rfc3339(),
            sources: None,
            confidence: None,
            category: None,
        }
    }

    /// Attaches citations; an empty list is stored as `None`.
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = if sources.is_empty() { None } else { Some(sources) };
        self
    }

    pub fn with_routing(mut self, category: Option<String>, confidence: Option<f64>) -> Self {
        self.category = category;
        self.confidence = confidence;
        self
    }
}
