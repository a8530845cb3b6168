//! Backend gateway implementations.
//!
//! [`HttpBackendGateway`] talks to the FAQ backend's REST API and is the
//! production implementation of
//! [`BackendGateway`](finchat_core::gateway::BackendGateway).

pub mod http_gateway;

pub use http_gateway::HttpBackendGateway;
