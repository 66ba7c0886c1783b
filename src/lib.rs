//! rpc-binder Library
//!
//! Client-side endpoint binding and connection selection for an RPC runtime:
//! proxies carry candidate endpoints and binding-policy flags, the binder
//! selects, establishes, caches and reuses transport connections.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::outbound::TokioConnector;
pub use application::Binder;
pub use config::{load_config, Config};
pub use domain::endpoint::{Endpoint, EndpointSet, TransportKind};
pub use domain::key::ConnectionKey;
pub use domain::ports::{Connector, Transport};
pub use domain::proxy::{EndpointSelection, Identity, Mode, Proxy};
pub use error::BindError;
pub use infrastructure::connection::Connection;
pub use infrastructure::connection_cache::ConnectionCache;
