//! Application layer of the FinChat client.
//!
//! Wires the session store, the conversation store and the chat service
//! together through a [`SessionCoordinator`], so identity changes reach the
//! conversation cache without the stores knowing about each other.

pub mod chat_service;
pub mod client;
pub mod conversation;
pub mod coordinator;
pub mod generation;
pub mod session;

pub use chat_service::{ChatService, SendOutcome};
pub use client::ChatClient;
pub use conversation::{ConversationAction, ConversationState, ConversationStore};
pub use coordinator::{IdentitySubscriber, SessionCoordinator};
pub use generation::IdentityGeneration;
pub use session::{SessionAction, SessionState, SessionStore};
