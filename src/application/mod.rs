//! Application Layer
//!
//! The binder orchestrates candidate selection, the connection cache and the
//! transport connector.

pub mod binder;

pub use binder::Binder;
