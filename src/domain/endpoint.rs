//! Endpoints - Immutable transport addresses
//!
//! An endpoint is one concrete address+transport+security combination at
//! which a remote object adapter may be reached. Endpoints are value objects:
//! equal by all fields, never mutated after creation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transport kind of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportKind {
    /// Plain TCP stream
    Tcp,
    /// UDP datagram
    Udp,
    /// TLS over TCP
    Ssl,
}

impl TransportKind {
    /// Parse a transport kind from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tcp" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            "ssl" => Some(Self::Ssl),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Ssl => "ssl",
        }
    }

    /// Whether this transport carries datagrams rather than a stream.
    pub fn is_datagram(&self) -> bool {
        matches!(self, Self::Udp)
    }

    /// Whether this transport is secured.
    pub fn is_secure(&self) -> bool {
        matches!(self, Self::Ssl)
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One candidate network endpoint for a proxy.
///
/// Produced when an object reference is resolved; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Transport kind (tcp, udp, ssl)
    pub kind: TransportKind,
    /// Host name or address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Per-endpoint connect timeout override
    pub timeout: Option<Duration>,
    /// Whether this endpoint requires a secured transport
    pub secure: bool,
}

impl Endpoint {
    /// Create an endpoint. The secure flag follows the transport kind.
    pub fn new(kind: TransportKind, host: impl Into<String>, port: u16) -> Self {
        Self {
            kind,
            host: host.into(),
            port,
            timeout: None,
            secure: kind.is_secure(),
        }
    }

    /// Create a plain TCP endpoint.
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::new(TransportKind::Tcp, host, port)
    }

    /// Create a UDP endpoint.
    pub fn udp(host: impl Into<String>, port: u16) -> Self {
        Self::new(TransportKind::Udp, host, port)
    }

    /// Create an SSL endpoint.
    pub fn ssl(host: impl Into<String>, port: u16) -> Self {
        Self::new(TransportKind::Ssl, host, port)
    }

    /// Return a copy with a connect timeout override.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether this endpoint carries datagrams.
    pub fn is_datagram(&self) -> bool {
        self.kind.is_datagram()
    }

    /// Whether this endpoint is secured.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// The socket address string used for dialing.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}:{}", self.kind, self.host, self.port)
    }
}

/// Ordered sequence of candidate endpoints attached to a proxy.
///
/// The order is meaningful under `Ordered` selection and is the shuffle basis
/// under `Random` selection. Shared across proxy derivations by reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EndpointSet {
    endpoints: Vec<Endpoint>,
}

impl EndpointSet {
    /// Create a set from an ordered list of endpoints.
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self { endpoints }
    }

    /// Create an empty set (indirect proxies only).
    pub fn empty() -> Self {
        Self { endpoints: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn as_slice(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Endpoint> {
        self.endpoints.iter()
    }

    /// Whether any endpoint in the set matches the given one.
    pub fn contains(&self, endpoint: &Endpoint) -> bool {
        self.endpoints.contains(endpoint)
    }
}

impl From<Vec<Endpoint>> for EndpointSet {
    fn from(endpoints: Vec<Endpoint>) -> Self {
        Self::new(endpoints)
    }
}
