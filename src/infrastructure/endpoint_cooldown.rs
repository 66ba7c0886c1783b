//! Endpoint Cooldown
//!
//! Tracks endpoints whose last connection attempt failed. Such endpoints are
//! kept out of the immediate retry path for a bounded window, then become
//! eligible again; they are never excluded permanently.

use crate::domain::endpoint::Endpoint;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Bounded retry suppression for endpoints that just failed to connect.
pub struct EndpointCooldown {
    /// Window during which a failed endpoint is demoted
    window: Duration,
    /// Last connect failure per endpoint
    failures: DashMap<Endpoint, Instant>,
}

impl EndpointCooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            failures: DashMap::new(),
        }
    }

    /// Record a connection-establishment failure for an endpoint.
    ///
    /// Expired records are swept here as well; `is_cooling_down` only prunes
    /// the endpoint it is asked about, so endpoints nothing queries again
    /// would otherwise linger.
    pub fn record_failure(&self, endpoint: &Endpoint) {
        self.failures
            .retain(|_, failed_at| failed_at.elapsed() < self.window);
        tracing::debug!("cooling down {} for {:?}", endpoint, self.window);
        self.failures.insert(endpoint.clone(), Instant::now());
    }

    /// Clear an endpoint's failure record after a successful connect.
    pub fn clear(&self, endpoint: &Endpoint) {
        self.failures.remove(endpoint);
    }

    /// Whether the endpoint is still inside its retry-suppression window.
    ///
    /// An aged-out record is removed on the way through.
    pub fn is_cooling_down(&self, endpoint: &Endpoint) -> bool {
        let expired = {
            match self.failures.get(endpoint) {
                Some(entry) => entry.elapsed() >= self.window,
                None => return false,
            }
        };
        if expired {
            self.failures.remove(endpoint);
            return false;
        }
        true
    }

    /// Number of endpoints currently tracked.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}
