//! Connection Key
//!
//! Identifies a cache slot for a live connection. Two proxies whose derived
//! keys match must share one connection; a differing connection-id partitions
//! the cache even when the underlying network address is identical.

use crate::domain::endpoint::Endpoint;
use std::hash::{Hash, Hasher};

/// Composite key for the process-wide connection cache.
#[derive(Debug, Clone, Eq)]
pub struct ConnectionKey {
    /// The endpoint the connection is bound to
    pub endpoint: Endpoint,
    /// Whether a secured transport was required
    pub secure: bool,
    /// Whether the connection is datagram-mode
    pub datagram: bool,
    /// Optional partition label; distinct labels never share a connection
    pub connection_id: String,
}

impl ConnectionKey {
    /// Build the key for a given endpoint under the given policy.
    pub fn new(endpoint: Endpoint, secure: bool, connection_id: impl Into<String>) -> Self {
        let datagram = endpoint.is_datagram();
        Self {
            endpoint,
            secure,
            datagram,
            connection_id: connection_id.into(),
        }
    }
}

impl PartialEq for ConnectionKey {
    fn eq(&self, other: &Self) -> bool {
        self.endpoint == other.endpoint
            && self.secure == other.secure
            && self.datagram == other.datagram
            && self.connection_id == other.connection_id
    }
}

impl Hash for ConnectionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.endpoint.hash(state);
        self.secure.hash(state);
        self.datagram.hash(state);
        self.connection_id.hash(state);
    }
}

impl std::fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.endpoint)?;
        if self.secure {
            write!(f, " (secure)")?;
        }
        if !self.connection_id.is_empty() {
            write!(f, " [{}]", self.connection_id)?;
        }
        Ok(())
    }
}
