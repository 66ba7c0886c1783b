//! Outbound Adapters
//!
//! Concrete implementations of the domain ports.

pub mod tokio_connector;

pub use tokio_connector::TokioConnector;
