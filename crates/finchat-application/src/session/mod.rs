//! Session store: identity lifecycle against the backend.

mod state;
mod store;

pub use state::{SessionAction, SessionState};
pub use store::{CREATE_SESSION_FAILED, LOGIN_FAILED, SessionStore};
