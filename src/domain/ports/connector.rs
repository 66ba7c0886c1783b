//! Connector Port
//!
//! Defines the interface to the transport layer: establishing a raw transport
//! session to one endpoint. Everything above the socket (framing, TLS
//! handshaking, request dispatch) belongs to the surrounding runtime.

use crate::domain::endpoint::Endpoint;
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::{TcpStream, UdpSocket};

/// Raw transport session handed over by a connector.
#[derive(Debug)]
pub enum Transport {
    /// Stream transport (tcp and, at the socket level, ssl)
    Tcp(TcpStream),
    /// Datagram transport
    Udp(UdpSocket),
}

/// Connection-establishment failures reported by a connector.
///
/// These are the only failures that make the binder advance to the next
/// candidate endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The endpoint refused the connection or is unreachable.
    #[error("connect refused: {0}")]
    Refused(String),
    /// Connection establishment did not complete in time.
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
}

/// Establishes raw transport sessions to endpoints.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Dial an endpoint, giving up after `timeout`.
    async fn connect(&self, endpoint: &Endpoint, timeout: Duration)
        -> Result<Transport, ConnectError>;
}
