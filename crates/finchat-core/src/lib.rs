//! Domain layer of the FinChat client.
//!
//! Holds the models shared by every other crate (sessions, conversations,
//! messages), the ports the application layer is written against
//! ([`storage::KeyValueStore`], [`gateway::BackendGateway`]) and the shared
//! error type.

pub mod config;
pub mod conversation;
pub mod error;
pub mod gateway;
pub mod session;
pub mod storage;

// Re-export common error type
pub use error::FinchatError;
