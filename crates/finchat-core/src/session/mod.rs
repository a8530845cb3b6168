//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: identity types (`UserType`, `SessionInfo`, `SessionUser`)
//! - `status`: the session lifecycle state machine (`SessionStatus`)
//! - `event`: identity transitions broadcast to other stores (`IdentityEvent`)

mod event;
mod model;
mod status;

// Re-export public API
pub use event::IdentityEvent;
pub use model::{SessionInfo, SessionUser, UserType};
pub use status::SessionStatus;
