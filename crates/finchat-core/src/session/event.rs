use crate::conversation::Message;
use serde::{Deserialize, Serialize};

use super::UserType;

/// Identity transitions announced by the session store.
///
/// Published only after the new identity has been persisted, so subscribers
/// may read it back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IdentityEvent {
    /// A new anonymous session was created or a login succeeded.
    Changed {
        session_id: String,
        user_type: UserType,
        generation: u64,
        /// Prior conversation returned by the backend on login, if any.
        #[serde(default)]
        history: Option<Vec<Message>>,
    },
    /// Local identity was wiped by an explicit logout.
    LoggedOut { generation: u64 },
}

impl IdentityEvent {
    pub fn generation(&self) -> u64 {
        match self {
            IdentityEvent::Changed { generation, .. } => *generation,
            IdentityEvent::LoggedOut { generation } => *generation,
        }
    }
}
