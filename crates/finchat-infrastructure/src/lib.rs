pub mod config_storage;
pub mod conversation_storage;
pub mod identity_storage;
pub mod kv;
pub mod paths;

pub use crate::config_storage::ConfigStorage;
pub use crate::conversation_storage::ConversationStorage;
pub use crate::identity_storage::{IdentityStorage, PersistedIdentity};
pub use crate::kv::{FileKeyValueStore, InMemoryKeyValueStore};
pub use crate::paths::FinchatPaths;
