//! Session lifecycle state machine.

use super::model::UserType;
use serde::{Deserialize, Serialize};

/// Lifecycle state of the session store.
///
/// ```text
/// Uninitialized -> Loading -> Anonymous | Authenticated
///                     |
///                     +-> Error -> Loading (next initialize / anonymous retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Uninitialized,
    Loading,
    Anonymous,
    Authenticated,
    Error,
}

impl SessionStatus {
    /// Settled state for an established identity of `user_type`.
    pub fn established(user_type: UserType) -> Self {
        match user_type {
            UserType::Anonymous => SessionStatus::Anonymous,
            UserType::Authenticated => SessionStatus::Authenticated,
        }
    }

    /// True once an identity usable for backend calls exists.
    pub fn is_established(&self) -> bool {
        matches!(self, SessionStatus::Anonymous | SessionStatus::Authenticated)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// `Error` can only be left through `Loading`; established states may
    /// switch directly (login upgrades, expiry downgrades) or reset to
    /// `Uninitialized` on logout.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        match (self, next) {
            (_, Loading) => true,
            (Loading, Anonymous | Authenticated | Error) => true,
            (Anonymous | Authenticated, Anonymous | Authenticated | Uninitialized) => true,
            (Anonymous | Authenticated, Error) => true,
            (Uninitialized, Error) => true,
            _ => false,
        }
    }
}
