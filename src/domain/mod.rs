//! Domain Layer
//!
//! Immutable values (endpoints, proxies, keys), pure selection logic and the
//! transport port. Nothing here performs I/O.

pub mod endpoint;
pub mod key;
pub mod ports;
pub mod proxy;
pub mod services;

pub use endpoint::{Endpoint, EndpointSet, TransportKind};
pub use key::ConnectionKey;
pub use proxy::{EndpointSelection, Identity, Mode, Proxy};
