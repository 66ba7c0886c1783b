//! Bind Failure Taxonomy
//!
//! Candidate-level connect failures are recovered inside the binder; the
//! variants here are what callers see: exhaustion surfaces the last attempted
//! candidate's failure verbatim, mode mismatches and cancellations surface
//! immediately.

use crate::domain::endpoint::Endpoint;
use std::time::Duration;

#[derive(Debug, Clone, thiserror::Error)]
pub enum BindError {
    /// The proxy has no usable endpoint and no resolvable indirection.
    #[error("no suitable endpoint for proxy `{0}`")]
    NoEndpoint(String),

    /// The last attempted candidate refused the connection.
    #[error("connect to {endpoint} failed: {reason}")]
    ConnectFailed { endpoint: Endpoint, reason: String },

    /// The last attempted candidate timed out.
    #[error("connect to {endpoint} timed out after {after:?}")]
    ConnectTimeout { endpoint: Endpoint, after: Duration },

    /// A reply-expecting invocation was attempted over a datagram binding.
    #[error("operation requires a twoway-capable connection")]
    TwowayOnly,

    /// The caller canceled its pending bind; other waiters are unaffected.
    #[error("invocation canceled")]
    InvocationCanceled,

    /// A previously-good connection was lost after binding.
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}

impl BindError {
    /// Whether this failure is a connection-establishment failure, i.e. one
    /// that makes the binder advance to the next candidate.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, Self::ConnectFailed { .. } | Self::ConnectTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = BindError::NoEndpoint("hello".to_string());
        assert_eq!(err.to_string(), "no suitable endpoint for proxy `hello`");

        let err = BindError::ConnectFailed {
            endpoint: Endpoint::tcp("h", 1),
            reason: "refused".to_string(),
        };
        assert_eq!(err.to_string(), "connect to tcp://h:1 failed: refused");

        assert_eq!(
            BindError::TwowayOnly.to_string(),
            "operation requires a twoway-capable connection"
        );
        assert_eq!(BindError::InvocationCanceled.to_string(), "invocation canceled");
    }

    #[test]
    fn test_is_connect_failure() {
        assert!(BindError::ConnectFailed {
            endpoint: Endpoint::tcp("h", 1),
            reason: "x".to_string()
        }
        .is_connect_failure());
        assert!(BindError::ConnectTimeout {
            endpoint: Endpoint::tcp("h", 1),
            after: Duration::from_secs(1)
        }
        .is_connect_failure());

        assert!(!BindError::TwowayOnly.is_connect_failure());
        assert!(!BindError::NoEndpoint("p".to_string()).is_connect_failure());
        assert!(!BindError::InvocationCanceled.is_connect_failure());
    }
}
