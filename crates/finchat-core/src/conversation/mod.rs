//! Conversation domain module.
//!
//! - `message`: a single chat turn (`Message`, `MessageRole`)
//! - `model`: a titled, ordered thread of messages (`Conversation`)

mod message;
mod model;

pub use message::{Message, MessageRole};
pub use model::{Conversation, DEFAULT_TITLE, HISTORY_TITLE, MAX_TITLE_CHARS, derive_title};
