//! Connection Cache
//!
//! Process-wide registry mapping connection keys to live connections.
//! Enforces at-most-one-connection-per-key: racers for an unconnected key
//! serialize on that key's own lock, the winner's dial runs detached and
//! installs the result, everyone else reuses it. No lock is held across the
//! network dial except the single-flight lock of the key being established.

use crate::domain::key::ConnectionKey;
use crate::infrastructure::connection::Connection;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Keyed registry of live connections.
///
/// Not a singleton: each communicator-like owner constructs its own cache so
/// tests get isolated connection state.
#[derive(Default)]
pub struct ConnectionCache {
    /// Live connections by key
    entries: DashMap<ConnectionKey, Arc<Connection>>,
    /// Per-key single-flight locks, pruned together with their entry
    locks: DashMap<ConnectionKey, Arc<Mutex<()>>>,
}

impl ConnectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an open connection for a key.
    ///
    /// A closed connection is never returned; stale entries are evicted on
    /// the way through.
    pub fn lookup(&self, key: &ConnectionKey) -> Option<Arc<Connection>> {
        match self.entries.get(key) {
            Some(entry) if entry.is_open() => return Some(entry.clone()),
            Some(_) => {}
            None => return None,
        }
        // The entry was closed under us; drop it unless a racer already
        // replaced it with an open one.
        tracing::debug!("evicting closed connection for {}", key);
        self.entries.remove_if(key, |_, conn| !conn.is_open());
        None
    }

    /// Install a connection for a key.
    pub fn store(&self, connection: Arc<Connection>) {
        self.entries.insert(connection.key().clone(), connection);
    }

    /// Return the open connection for a key, dialing through `connect` if
    /// there is none.
    ///
    /// The dial runs while holding only this key's lock, so a burst of
    /// concurrent first binds for one key performs exactly one connect
    /// attempt. The establishment itself is detached from the waiting
    /// caller: abandoning the wait (dropping the future) neither aborts the
    /// dial nor discards a just-completed connect, and the next waiter picks
    /// the installed result up. Other keys are untouched throughout.
    pub async fn get_or_connect<F, Fut, E>(
        self: &Arc<Self>,
        key: &ConnectionKey,
        connect: F,
    ) -> Result<Arc<Connection>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<Connection>, E>> + Send + 'static,
        E: Send + 'static,
    {
        if let Some(conn) = self.lookup(key) {
            return Ok(conn);
        }

        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = lock.lock_owned().await;

        // A racer may have installed the connection while we waited.
        if let Some(conn) = self.lookup(key) {
            return Ok(conn);
        }

        // The dial task owns the key lock and installs the result itself, so
        // it survives its caller going away.
        let cache = Arc::clone(self);
        let fut = connect();
        let dial = tokio::spawn(async move {
            let _guard = guard;
            let conn = fut.await?;
            cache.store(conn.clone());
            tracing::debug!("cached connection #{} for {}", conn.id(), conn.key());
            Ok(conn)
        });

        match dial.await {
            Ok(result) => result,
            // The dial task is never aborted; a join failure means the
            // connector panicked, re-raised here.
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }

    /// Remove a specific connection's entry. A newer connection installed
    /// under the same key is left alone, lock included.
    pub fn evict(&self, connection: &Arc<Connection>) {
        let removed = self
            .entries
            .remove_if(connection.key(), |_, cached| Arc::ptr_eq(cached, connection))
            .is_some();
        if removed {
            self.locks.remove(connection.key());
        }
    }

    /// Remove the entry for a key, returning it for teardown.
    ///
    /// The key's single-flight lock is pruned as well; in-flight racers keep
    /// their clone of it alive until they finish.
    pub fn invalidate(&self, key: &ConnectionKey) -> Option<Arc<Connection>> {
        self.locks.remove(key);
        self.entries.remove(key).map(|(_, conn)| {
            tracing::debug!("invalidated connection #{} for {}", conn.id(), key);
            conn
        })
    }

    /// Remove every entry whose key matches the predicate, returning the
    /// removed connections for teardown. Matching lock slots are pruned too.
    pub fn invalidate_where<P>(&self, predicate: P) -> Vec<Arc<Connection>>
    where
        P: Fn(&ConnectionKey) -> bool,
    {
        let keys: Vec<ConnectionKey> = self
            .entries
            .iter()
            .filter(|entry| predicate(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();

        keys.iter()
            .filter_map(|key| {
                self.locks.remove(key);
                self.entries.remove(key).map(|(_, conn)| conn)
            })
            .collect()
    }

    /// Number of cached entries (open or not yet evicted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
        self.locks.clear();
    }
}
