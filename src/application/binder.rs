//! Binder
//!
//! The core binding algorithm: given a proxy's endpoint set and policy,
//! select candidates, reuse a cached connection when allowed, otherwise
//! establish one candidate at a time and surface the last failure on
//! exhaustion.

use crate::adapters::outbound::TokioConnector;
use crate::config::Config;
use crate::domain::endpoint::Endpoint;
use crate::domain::key::ConnectionKey;
use crate::domain::ports::{ConnectError, Connector};
use crate::domain::proxy::Proxy;
use crate::domain::services::CandidateSelector;
use crate::error::BindError;
use crate::infrastructure::connection::Connection;
use crate::infrastructure::connection_cache::ConnectionCache;
use crate::infrastructure::endpoint_cooldown::EndpointCooldown;
use std::sync::Arc;
use std::time::Duration;

/// Binds proxies to connections.
///
/// Owns the connection cache and the failed-endpoint cooldown tracker; each
/// communicator-like owner constructs its own binder so tests get isolated
/// connection state.
pub struct Binder {
    config: Config,
    connector: Arc<dyn Connector>,
    cache: Arc<ConnectionCache>,
    cooldown: EndpointCooldown,
}

impl Binder {
    /// Create a binder using the default tokio connector.
    pub fn new(config: Config) -> Self {
        Self::with_connector(Arc::new(TokioConnector::new()), config)
    }

    /// Create a binder with a custom connector.
    pub fn with_connector(connector: Arc<dyn Connector>, config: Config) -> Self {
        let cooldown = EndpointCooldown::new(config.retry_cooldown);
        Self {
            config,
            connector,
            cache: Arc::new(ConnectionCache::new()),
            cooldown,
        }
    }

    /// The binder's connection cache.
    pub fn cache(&self) -> &ConnectionCache {
        &self.cache
    }

    /// Bind a proxy to a connection.
    ///
    /// With connection caching enabled, candidates are first scanned for an
    /// open cached connection in the same order they would be dialed, so
    /// proxies built from permutations of one endpoint set converge on one
    /// shared connection. On a miss the candidates are dialed strictly one at
    /// a time; only connection-establishment failures advance to the next
    /// candidate, and exhaustion surfaces the last candidate's failure.
    ///
    /// With caching disabled, every call dials fresh and the cache is neither
    /// consulted nor populated (per-request binding).
    pub async fn bind(&self, proxy: &Proxy) -> Result<Arc<Connection>, BindError> {
        let candidates =
            CandidateSelector::candidates(proxy, |e| self.cooldown.is_cooling_down(e))?;

        if proxy.is_connection_cached() {
            for endpoint in &candidates {
                let key = proxy.connection_key(endpoint);
                if let Some(conn) = self.cache.lookup(&key) {
                    tracing::debug!(
                        "proxy `{}` reusing connection #{} to {}",
                        proxy.identity(),
                        conn.id(),
                        key
                    );
                    return Ok(conn);
                }
            }
        }

        let mut last_err: Option<BindError> = None;
        for endpoint in &candidates {
            let key = proxy.connection_key(endpoint);

            let attempt = if proxy.is_connection_cached() {
                // The dial future owns everything it needs so the cache can
                // run it detached from this caller.
                let connector = Arc::clone(&self.connector);
                let timeout = endpoint.timeout.unwrap_or(self.config.connect_timeout);
                let dial_key = key.clone();
                self.cache
                    .get_or_connect(&key, move || Self::dial(connector, dial_key, timeout))
                    .await
            } else {
                self.establish(key.clone()).await
            };

            match attempt {
                Ok(conn) => {
                    self.cooldown.clear(endpoint);
                    tracing::debug!(
                        "proxy `{}` bound to {} (connection #{})",
                        proxy.identity(),
                        endpoint,
                        conn.id()
                    );
                    return Ok(conn);
                }
                Err(err) => {
                    tracing::debug!("bind attempt to {} failed: {}", endpoint, err);
                    self.cooldown.record_failure(endpoint);
                    last_err = Some(Self::connect_error(err, endpoint));
                }
            }
        }

        // Candidates are never empty here; keep the fallback for safety.
        Err(last_err.unwrap_or_else(|| BindError::NoEndpoint(proxy.to_string())))
    }

    /// Bind with a caller-side deadline.
    ///
    /// Elapsing surfaces `InvocationCanceled` to this caller only; a
    /// concurrent bind racing the same key keeps going.
    pub async fn bind_with_timeout(
        &self,
        proxy: &Proxy,
        timeout: Duration,
    ) -> Result<Arc<Connection>, BindError> {
        match tokio::time::timeout(timeout, self.bind(proxy)).await {
            Ok(result) => result,
            Err(_) => Err(BindError::InvocationCanceled),
        }
    }

    /// React to a transport-level failure on a previously-good connection:
    /// close it, drop it from the cache and demote its endpoint. The caller
    /// rebinds afterwards if the failed operation is retry-eligible.
    pub async fn report_failure(&self, conn: &Arc<Connection>) {
        tracing::warn!("connection #{} to {} lost", conn.id(), conn.key());
        conn.close().await;
        self.cache.evict(conn);
        self.cooldown.record_failure(conn.endpoint());
    }

    /// Adapter-lifecycle hook: an endpoint's adapter was deactivated, so
    /// proactively close and invalidate every connection bound to it instead
    /// of leaving them to fail lazily on next use.
    pub async fn endpoint_deactivated(&self, endpoint: &Endpoint) {
        let removed = self
            .cache
            .invalidate_where(|key| key.endpoint == *endpoint);
        for conn in &removed {
            conn.close().await;
        }
        self.cooldown.record_failure(endpoint);
        tracing::info!(
            "endpoint {} deactivated, dropped {} cached connections",
            endpoint,
            removed.len()
        );
    }

    async fn establish(&self, key: ConnectionKey) -> Result<Arc<Connection>, ConnectError> {
        let timeout = key.endpoint.timeout.unwrap_or(self.config.connect_timeout);
        Self::dial(Arc::clone(&self.connector), key, timeout).await
    }

    async fn dial(
        connector: Arc<dyn Connector>,
        key: ConnectionKey,
        timeout: Duration,
    ) -> Result<Arc<Connection>, ConnectError> {
        let transport = connector.connect(&key.endpoint, timeout).await?;
        Ok(Arc::new(Connection::new(key, transport)))
    }

    fn connect_error(err: ConnectError, endpoint: &Endpoint) -> BindError {
        match err {
            ConnectError::Refused(reason) => BindError::ConnectFailed {
                endpoint: endpoint.clone(),
                reason,
            },
            ConnectError::Timeout(after) => BindError::ConnectTimeout {
                endpoint: endpoint.clone(),
                after,
            },
        }
    }
}

impl Proxy {
    /// Bind this proxy, surfacing the same failure taxonomy as a live
    /// invocation would.
    pub async fn get_connection(&self, binder: &Binder) -> Result<Arc<Connection>, BindError> {
        binder.bind(self).await
    }
}
