//! Candidate Selector Service
//!
//! Pure logic for turning a proxy's endpoint set into the ordered list of
//! candidates the binder will try. This service has NO external dependencies
//! beyond the shuffle; cooldown state is injected as a closure.

use crate::domain::endpoint::Endpoint;
use crate::domain::proxy::{EndpointSelection, Proxy};
use crate::error::BindError;
use rand::seq::SliceRandom;

/// Selects and orders candidate endpoints for a bind attempt.
///
/// The resulting order layers three concerns, strongest last:
/// 1. Base order: the set's own order (`Ordered`) or a uniform shuffle
///    (`Random`).
/// 2. Security preference: insecure endpoints first by default, secure first
///    under `prefer_secure`. A `secure` proxy has already filtered insecure
///    endpoints out entirely.
/// 3. Cooldown: endpoints still inside the failed-endpoint retry window are
///    demoted to the back of the list, never removed.
pub struct CandidateSelector;

impl CandidateSelector {
    /// Compute the try order for a proxy.
    ///
    /// # Errors
    ///
    /// - `NoEndpoint` if the set is empty, or empty after security filtering,
    ///   or a datagram proxy has no datagram-capable endpoint.
    /// - `TwowayOnly` if a reply-expecting proxy is left with nothing because
    ///   every endpoint is datagram-only; this is a mode mismatch, not a bind
    ///   failure.
    pub fn candidates<F>(proxy: &Proxy, is_cooling_down: F) -> Result<Vec<Endpoint>, BindError>
    where
        F: Fn(&Endpoint) -> bool,
    {
        let raw = proxy.endpoints().as_slice();
        if raw.is_empty() {
            // Indirect proxies would be resolved through a locator here.
            return Err(BindError::NoEndpoint(proxy.to_string()));
        }

        // Mode filter: datagram proxies only consider datagram endpoints,
        // stream proxies never bind to datagram endpoints.
        let mode = proxy.mode();
        let mut filtered: Vec<Endpoint> = raw
            .iter()
            .filter(|e| e.is_datagram() == mode.is_datagram())
            .cloned()
            .collect();

        if filtered.is_empty() {
            if mode.expects_reply() {
                return Err(BindError::TwowayOnly);
            }
            return Err(BindError::NoEndpoint(proxy.to_string()));
        }

        // Security filter: an explicitly secure proxy never sees insecure
        // endpoints.
        if proxy.is_secure() {
            filtered.retain(|e| e.is_secure());
            if filtered.is_empty() {
                return Err(BindError::NoEndpoint(proxy.to_string()));
            }
        }

        // Base order.
        match proxy.endpoint_selection() {
            EndpointSelection::Ordered => {}
            EndpointSelection::Random => {
                filtered.shuffle(&mut rand::thread_rng());
            }
        }

        // Security preference (stable, keeps base order within each group).
        if !proxy.is_secure() {
            if proxy.prefers_secure() {
                filtered.sort_by_key(|e| !e.is_secure());
            } else {
                filtered.sort_by_key(|e| e.is_secure());
            }
        }

        // Cooldown demotion (stable, strongest ordering concern).
        filtered.sort_by_key(|e| is_cooling_down(e));

        Ok(filtered)
    }
}
