//! Infrastructure Layer
//!
//! Live connections, the process-wide connection cache and the
//! failed-endpoint cooldown tracker.

pub mod connection;
pub mod connection_cache;
pub mod endpoint_cooldown;

pub use connection::{Connection, Transport};
pub use connection_cache::ConnectionCache;
pub use endpoint_cooldown::EndpointCooldown;
