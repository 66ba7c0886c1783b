//! Connections
//!
//! A connection is a live transport session to one endpoint. Connections are
//! created by the binder, shared across proxies via the cache, and never
//! handed to a new caller once closed.

use crate::domain::endpoint::Endpoint;
use crate::domain::key::ConnectionKey;
use crate::domain::proxy::Mode;
use crate::error::BindError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub use crate::domain::ports::connector::Transport;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Live transport session to one endpoint.
///
/// The transport handle is guarded by an async mutex so the invocation layer
/// can drive it from concurrent tasks; binding-side state (open flag, key) is
/// lock-free.
pub struct Connection {
    /// Process-unique connection number, for logs and sharing assertions
    id: u64,
    /// Cache key this connection was established under
    key: ConnectionKey,
    /// The transport, taken out on close
    transport: Mutex<Option<Transport>>,
    /// Cleared exactly once, on close or transport failure
    open: AtomicBool,
    /// When the connection was established
    established_at: Instant,
}

impl Connection {
    /// Wrap a freshly established transport.
    pub fn new(key: ConnectionKey, transport: Transport) -> Self {
        Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            key,
            transport: Mutex::new(Some(transport)),
            open: AtomicBool::new(true),
            established_at: Instant::now(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn key(&self) -> &ConnectionKey {
        &self.key
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.key.endpoint
    }

    pub fn established_at(&self) -> Instant {
        self.established_at
    }

    /// Whether the connection can still be handed to callers.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Whether this connection carries datagrams.
    pub fn is_datagram(&self) -> bool {
        self.key.datagram
    }

    /// Reject invocation modes the transport cannot carry.
    ///
    /// A reply-expecting call over a datagram binding is a mode mismatch
    /// surfaced immediately; it never triggers a rebind.
    pub fn validate_mode(&self, mode: Mode) -> Result<(), BindError> {
        if mode.expects_reply() && self.key.datagram {
            return Err(BindError::TwowayOnly);
        }
        Ok(())
    }

    /// Borrow the transport for an exchange. Returns `ConnectionLost` if the
    /// connection was closed under the caller.
    pub async fn transport(&self) -> Result<tokio::sync::MutexGuard<'_, Option<Transport>>, BindError> {
        if !self.is_open() {
            return Err(BindError::ConnectionLost("connection is closed".to_string()));
        }
        Ok(self.transport.lock().await)
    }

    /// Close the connection. Idempotent; a stream transport is shut down.
    pub async fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            tracing::debug!("closing connection #{} to {}", self.id, self.key);
            let mut guard = self.transport.lock().await;
            if let Some(Transport::Tcp(mut stream)) = guard.take() {
                let _ = stream.shutdown().await;
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("open", &self.is_open())
            .finish()
    }
}
