//! Domain Ports
//!
//! Interfaces to the infrastructure this core depends on.

pub mod connector;

pub use connector::{ConnectError, Connector, Transport};
