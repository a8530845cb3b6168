use finchat_core::conversation::{Conversation, Message};

/// Observable state of the conversation store.
///
/// `current_messages` is the working view of the selected conversation. It
/// diverges from the list entry while a turn is in flight and is written
/// back with [`ConversationAction::UpdateConversation`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    pub conversations: Vec<Conversation>,
    pub current_conversation_id: Option<String>,
    pub current_messages: Vec<Message>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl ConversationState {
    pub fn find(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Applies `action` as a single atomic update.
    pub fn apply(&mut self, action: ConversationAction) {
        match action {
            ConversationAction::SetLoading(loading) => self.is_loading = loading,
            ConversationAction::SetError(error) => self.error = error,
            ConversationAction::AddMessage(message) => self.current_messages.push(message),
            ConversationAction::SetMessages(messages) => self.current_messages = messages,
            ConversationAction::SetConversations(conversations) => {
                self.conversations = conversations
            }
            ConversationAction::AddConversation(conversation) => {
                self.conversations.insert(0, conversation)
            }
            ConversationAction::SetCurrent(id) => {
                self.current_messages = id
                    .as_deref()
                    .and_then(|id| self.find(id))
                    .map(|c| c.messages.clone())
                    .unwrap_or_default();
                self.current_conversation_id = id;
            }
            ConversationAction::UpdateConversation { id, messages } => {
                if self.current_conversation_id.as_deref() == Some(id.as_str()) {
                    self.current_messages = messages.clone();
                }
                if let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) {
                    conversation.replace_messages(messages);
                } else {
                    tracing::debug!("Update for unknown conversation {} ignored", id);
                }
            }
            ConversationAction::DeleteConversation(id) => {
                self.conversations.retain(|c| c.id != id);
                if self.current_conversation_id.as_deref() == Some(id.as_str()) {
                    self.current_conversation_id = None;
                    self.current_messages.clear();
                }
            }
            ConversationAction::ClearCurrent => {
                self.current_conversation_id = None;
                self.current_messages.clear();
                self.conversations.clear();
            }
        }
    }
}

/// Updates accepted by [`ConversationState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationAction {
    SetLoading(bool),
    SetError(Option<String>),
    AddMessage(Message),
    SetMessages(Vec<Message>),
    SetConversations(Vec<Conversation>),
    /// Prepends a conversation; the newest is always first.
    AddConversation(Conversation),
    /// Selects a conversation and loads its messages into the working view.
    SetCurrent(Option<String>),
    UpdateConversation { id: String, messages: Vec<Message> },
    DeleteConversation(String),
    /// Empties the working view and the in-memory list. Storage is untouched.
    ClearCurrent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(ids: &[&str]) -> ConversationState {
        let mut state = ConversationState::default();
        for id in ids {
            state.apply(ConversationAction::AddConversation(Conversation::new(
                *id,
                Some("hello"),
            )));
        }
        state
    }

    #[test]
    fn test_add_conversation_prepends() {
        let state = state_with(&["a", "b"]);
        let ids: Vec<&str> = state.conversations.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_set_current_loads_messages() {
        let mut state = state_with(&["a"]);
        state.apply(ConversationAction::UpdateConversation {
            id: "a".to_string(),
            messages: vec![Message::user("hi"), Message::assistant("hello")],
        });

        state.apply(ConversationAction::SetCurrent(Some("a".to_string())));
        assert_eq!(state.current_messages.len(), 2);

        state.apply(ConversationAction::SetCurrent(Some("missing".to_string())));
        assert_eq!(state.current_conversation_id.as_deref(), Some("missing"));
        assert!(state.current_messages.is_empty());
    }

    #[test]
    fn test_delete_current_clears_view() {
        let mut state = state_with(&["a", "b"]);
        state.apply(ConversationAction::SetCurrent(Some("a".to_string())));
        state.apply(ConversationAction::AddMessage(Message::user("draft")));

        state.apply(ConversationAction::DeleteConversation("b".to_string()));
        assert_eq!(state.current_conversation_id.as_deref(), Some("a"));
        assert_eq!(state.current_messages.len(), 1);

        state.apply(ConversationAction::DeleteConversation("a".to_string()));
        assert!(state.conversations.is_empty());
        assert!(state.current_conversation_id.is_none());
        assert!(state.current_messages.is_empty());
    }

    #[test]
    fn test_update_current_refreshes_view() {
        let mut state = state_with(&["a", "b"]);
        state.apply(ConversationAction::SetCurrent(Some("a".to_string())));
        let messages = vec![Message::user("q"), Message::assistant("a")];

        state.apply(ConversationAction::UpdateConversation {
            id: "b".to_string(),
            messages: messages.clone(),
        });
        assert!(state.current_messages.is_empty());

        state.apply(ConversationAction::UpdateConversation {
            id: "a".to_string(),
            messages: messages.clone(),
        });
        assert_eq!(state.current_messages, messages);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut state = state_with(&["a"]);
        let before = state.clone();
        state.apply(ConversationAction::UpdateConversation {
            id: "zzz".to_string(),
            messages: vec![Message::user("x")],
        });
        assert_eq!(state, before);
    }

    #[test]
    fn test_clear_current_empties_everything() {
        let mut state = state_with(&["a"]);
        state.apply(ConversationAction::SetCurrent(Some("a".to_string())));
        state.apply(ConversationAction::ClearCurrent);
        assert!(state.conversations.is_empty());
        assert!(state.current_conversation_id.is_none());
    }
}
