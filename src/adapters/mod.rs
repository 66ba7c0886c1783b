//! Adapters Layer

pub mod outbound;
