//! Conversation store: the per-identity conversation cache.

mod state;
mod store;

pub use state::{ConversationAction, ConversationState};
pub use store::{ConversationStore, LOAD_FAILED};
