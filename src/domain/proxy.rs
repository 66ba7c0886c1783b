//! Proxy - Client-side handle to a remote object
//!
//! A proxy carries an identity, candidate endpoints (or an adapter id for
//! indirect binding) and binding-policy flags. Proxies are immutable; policy
//! changes go through derivation methods that return a new value sharing the
//! original endpoint set by reference.

use crate::domain::endpoint::{Endpoint, EndpointSet};
use crate::domain::key::ConnectionKey;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identity of the remote object a proxy designates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Object name
    pub name: String,
    /// Optional grouping category
    pub category: String,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: String::new(),
        }
    }

    pub fn with_category(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.category.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.category, self.name)
        }
    }
}

/// Invocation mode of a proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Request/response over a stream transport
    Twoway,
    /// Fire-and-forget over a stream transport
    Oneway,
    /// Queued oneway, flushed as a batch
    BatchOneway,
    /// Fire-and-forget over a datagram transport
    Datagram,
    /// Queued datagram, flushed as a batch
    BatchDatagram,
}

impl Mode {
    /// Whether this mode binds to datagram endpoints.
    pub fn is_datagram(&self) -> bool {
        matches!(self, Self::Datagram | Self::BatchDatagram)
    }

    /// Whether invocations in this mode expect a reply.
    pub fn expects_reply(&self) -> bool {
        matches!(self, Self::Twoway)
    }
}

/// Order in which candidate endpoints are tried during binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointSelection {
    /// Uniformly shuffled permutation per bind
    Random,
    /// The endpoint set's own order
    Ordered,
}

/// Immutable proxy value.
///
/// Structural equality covers identity, endpoints-or-adapter-id and every
/// policy flag; two proxies are "the same target" for cache-sharing purposes
/// iff their derived connection keys match, independent of object identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Proxy {
    identity: Identity,
    endpoints: Arc<EndpointSet>,
    adapter_id: Option<String>,
    mode: Mode,
    cache_connection: bool,
    selection: EndpointSelection,
    secure: bool,
    prefer_secure: bool,
    connection_id: String,
}

impl Proxy {
    /// Create a direct proxy with default policy: twoway, cached connection,
    /// random endpoint selection, insecure allowed.
    pub fn new(identity: Identity, endpoints: EndpointSet) -> Self {
        Self {
            identity,
            endpoints: Arc::new(endpoints),
            adapter_id: None,
            mode: Mode::Twoway,
            cache_connection: true,
            selection: EndpointSelection::Random,
            secure: false,
            prefer_secure: false,
            connection_id: String::new(),
        }
    }

    /// Create an indirect proxy carrying only an adapter id. With no locator
    /// wired in, binding such a proxy fails with `NoEndpoint`.
    pub fn indirect(identity: Identity, adapter_id: impl Into<String>) -> Self {
        let mut proxy = Self::new(identity, EndpointSet::empty());
        proxy.adapter_id = Some(adapter_id.into());
        proxy
    }

    // ===== Accessors =====

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    /// The shared endpoint-set handle (for sharing assertions).
    pub fn endpoints_handle(&self) -> &Arc<EndpointSet> {
        &self.endpoints
    }

    pub fn adapter_id(&self) -> Option<&str> {
        self.adapter_id.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_connection_cached(&self) -> bool {
        self.cache_connection
    }

    pub fn endpoint_selection(&self) -> EndpointSelection {
        self.selection
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn prefers_secure(&self) -> bool {
        self.prefer_secure
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    /// The cache key this proxy derives for one of its endpoints.
    pub fn connection_key(&self, endpoint: &Endpoint) -> ConnectionKey {
        ConnectionKey::new(
            endpoint.clone(),
            self.secure || endpoint.is_secure(),
            self.connection_id.clone(),
        )
    }

    // ===== Derivation (clone with one field changed) =====

    /// Derive a proxy with connection caching enabled or disabled.
    pub fn with_connection_cached(&self, cached: bool) -> Self {
        let mut proxy = self.clone();
        proxy.cache_connection = cached;
        proxy
    }

    /// Derive a proxy with a different endpoint-selection policy.
    pub fn with_endpoint_selection(&self, selection: EndpointSelection) -> Self {
        let mut proxy = self.clone();
        proxy.selection = selection;
        proxy
    }

    /// Derive a proxy that only binds to secured endpoints.
    pub fn with_secure(&self, secure: bool) -> Self {
        let mut proxy = self.clone();
        proxy.secure = secure;
        proxy
    }

    /// Derive a proxy that tries secured endpoints first but may fall back.
    pub fn with_prefer_secure(&self, prefer: bool) -> Self {
        let mut proxy = self.clone();
        proxy.prefer_secure = prefer;
        proxy
    }

    /// Derive a proxy whose connections live in a separate cache partition.
    pub fn with_connection_id(&self, id: impl Into<String>) -> Self {
        let mut proxy = self.clone();
        proxy.connection_id = id.into();
        proxy
    }

    /// Derive a proxy with a replaced endpoint set.
    pub fn with_endpoints(&self, endpoints: EndpointSet) -> Self {
        let mut proxy = self.clone();
        proxy.endpoints = Arc::new(endpoints);
        proxy
    }

    /// Derive an indirect proxy bound through an adapter id.
    pub fn with_adapter_id(&self, adapter_id: impl Into<String>) -> Self {
        let mut proxy = self.clone();
        proxy.adapter_id = Some(adapter_id.into());
        proxy
    }

    pub fn with_twoway(&self) -> Self {
        self.with_mode(Mode::Twoway)
    }

    pub fn with_oneway(&self) -> Self {
        self.with_mode(Mode::Oneway)
    }

    pub fn with_batch_oneway(&self) -> Self {
        self.with_mode(Mode::BatchOneway)
    }

    pub fn with_datagram(&self) -> Self {
        self.with_mode(Mode::Datagram)
    }

    pub fn with_batch_datagram(&self) -> Self {
        self.with_mode(Mode::BatchDatagram)
    }

    fn with_mode(&self, mode: Mode) -> Self {
        let mut proxy = self.clone();
        proxy.mode = mode;
        proxy
    }
}

impl std::fmt::Display for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identity)?;
        if let Some(adapter) = &self.adapter_id {
            write!(f, " @ {}", adapter)?;
        }
        for endpoint in self.endpoints.iter() {
            write!(f, " {}", endpoint)?;
        }
        Ok(())
    }
}
