//! Tokio Connector
//!
//! Default `Connector` implementation: TCP (and the ssl kind, at the socket
//! level) via `TcpStream`, UDP via a bound-and-connected `UdpSocket`.

use crate::domain::endpoint::Endpoint;
use crate::domain::ports::{ConnectError, Connector, Transport};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::{TcpStream, UdpSocket};

/// Connector backed by tokio sockets.
#[derive(Debug, Default, Clone)]
pub struct TokioConnector;

impl TokioConnector {
    pub fn new() -> Self {
        Self
    }

    async fn connect_stream(addr: &str, timeout: Duration) -> Result<TcpStream, ConnectError> {
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(ConnectError::Refused(e.to_string())),
            Err(_) => Err(ConnectError::Timeout(timeout)),
        }
    }

    async fn connect_datagram(addr: &str) -> Result<UdpSocket, ConnectError> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| ConnectError::Refused(e.to_string()))?;
        socket
            .connect(addr)
            .await
            .map_err(|e| ConnectError::Refused(e.to_string()))?;
        Ok(socket)
    }
}

#[async_trait]
impl Connector for TokioConnector {
    async fn connect(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<Transport, ConnectError> {
        let addr = endpoint.address();
        tracing::debug!("dialing {}", endpoint);

        if endpoint.is_datagram() {
            let socket = Self::connect_datagram(&addr).await?;
            Ok(Transport::Udp(socket))
        } else {
            let stream = Self::connect_stream(&addr, timeout).await?;
            Ok(Transport::Tcp(stream))
        }
    }
}
