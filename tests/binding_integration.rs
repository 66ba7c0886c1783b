//! Integration tests for proxy binding
//!
//! Exercises binding against real TCP/UDP listeners on ephemeral ports:
//! connection sharing, per-request rebinding, ordered failover and recovery,
//! secure and datagram isolation.

use rpc_binder::{
    Binder, BindError, Config, Endpoint, EndpointSelection, EndpointSet, Identity, Mode, Proxy,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};

fn test_config() -> Config {
    Config {
        connect_timeout: Duration::from_millis(500),
        retry_cooldown: Duration::from_millis(100),
    }
}

/// A listening adapter that counts the connections it accepts.
struct Adapter {
    endpoint: Endpoint,
    accepts: Arc<AtomicUsize>,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl Adapter {
    async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepts = Arc::new(AtomicUsize::new(0));
        let (shutdown, mut stopped) = tokio::sync::watch::channel(false);

        let counter = accepts.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        if result.is_err() {
                            break;
                        }
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                    _ = stopped.changed() => break,
                }
            }
        });

        Self {
            endpoint: Endpoint::tcp("127.0.0.1", port),
            accepts,
            shutdown,
        }
    }

    fn accepted(&self) -> usize {
        self.accepts.load(Ordering::SeqCst)
    }

    /// Stop accepting; the port becomes a dead endpoint.
    fn deactivate(&self) {
        let _ = self.shutdown.send(true);
    }
}

fn proxy_for(endpoints: Vec<Endpoint>) -> Proxy {
    Proxy::new(Identity::new("test"), EndpointSet::new(endpoints))
}

/// Sharing invariant: proxies built from permutations of one endpoint set
/// with default cached binding all converge on a single connection.
#[tokio::test]
async fn test_shuffled_proxies_share_one_connection() {
    let a = Adapter::spawn().await;
    let b = Adapter::spawn().await;
    let c = Adapter::spawn().await;

    let binder = Binder::new(test_config());

    let permutations = vec![
        vec![a.endpoint.clone(), b.endpoint.clone(), c.endpoint.clone()],
        vec![c.endpoint.clone(), a.endpoint.clone(), b.endpoint.clone()],
        vec![b.endpoint.clone(), c.endpoint.clone(), a.endpoint.clone()],
    ];

    let mut ids = Vec::new();
    for endpoints in permutations {
        let proxy = proxy_for(endpoints);
        let conn = proxy.get_connection(&binder).await.unwrap();
        ids.push(conn.id());
    }

    assert_eq!(ids[0], ids[1]);
    assert_eq!(ids[1], ids[2]);

    // One connect total across all three adapters
    tokio::time::sleep(Duration::from_millis(50)).await;
    let total = a.accepted() + b.accepted() + c.accepted();
    assert_eq!(total, 1);
}

/// Per-request rebinding: with caching disabled no connection is pinned, so
/// deactivating the first adapter moves subsequent calls to another one.
#[tokio::test]
async fn test_per_request_binding_is_not_pinned() {
    let a = Adapter::spawn().await;
    let b = Adapter::spawn().await;

    let binder = Binder::new(test_config());
    let proxy = proxy_for(vec![a.endpoint.clone(), b.endpoint.clone()])
        .with_endpoint_selection(EndpointSelection::Ordered)
        .with_connection_cached(false);

    let mut bound = std::collections::HashSet::new();
    for i in 0..10 {
        if i == 3 {
            a.deactivate();
            binder.endpoint_deactivated(&a.endpoint).await;
            // Let the listener task observe the shutdown and drop the socket
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
        let conn = binder.bind(&proxy).await.unwrap();
        bound.insert(conn.endpoint().clone());
        conn.close().await;
    }

    assert!(bound.len() > 1, "expected calls to reach more than one adapter");
    assert!(bound.contains(&b.endpoint));
}

/// Ordered exhaustion: with [A, B, C] and ordered selection, the bound
/// adapter advances A -> B -> C exactly as adapters disappear, and a final
/// bind after all three are down is a connect failure.
#[tokio::test]
async fn test_ordered_exhaustion() {
    // Initialize tracing for this test to cover tracing statements
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let a = Adapter::spawn().await;
    let b = Adapter::spawn().await;
    let c = Adapter::spawn().await;

    let binder = Binder::new(test_config());
    let proxy = proxy_for(vec![
        a.endpoint.clone(),
        b.endpoint.clone(),
        c.endpoint.clone(),
    ])
    .with_endpoint_selection(EndpointSelection::Ordered);

    let conn = binder.bind(&proxy).await.unwrap();
    assert_eq!(conn.endpoint(), &a.endpoint);

    a.deactivate();
    binder.endpoint_deactivated(&a.endpoint).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    let conn = binder.bind(&proxy).await.unwrap();
    assert_eq!(conn.endpoint(), &b.endpoint);

    b.deactivate();
    binder.endpoint_deactivated(&b.endpoint).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    let conn = binder.bind(&proxy).await.unwrap();
    assert_eq!(conn.endpoint(), &c.endpoint);

    c.deactivate();
    binder.endpoint_deactivated(&c.endpoint).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    let err = binder.bind(&proxy).await.unwrap_err();
    assert!(err.is_connect_failure(), "got {err}");
}

/// A deactivated endpoint stays demoted for the cooldown window, then becomes
/// eligible again once its adapter is back.
#[tokio::test]
async fn test_ordered_recovery_after_cooldown() {
    let a = Adapter::spawn().await;
    let b = Adapter::spawn().await;
    let port_a = a.endpoint.port;

    let binder = Binder::new(test_config());
    let proxy = proxy_for(vec![a.endpoint.clone(), b.endpoint.clone()])
        .with_endpoint_selection(EndpointSelection::Ordered);

    let conn = binder.bind(&proxy).await.unwrap();
    assert_eq!(conn.endpoint(), &a.endpoint);

    a.deactivate();
    binder.endpoint_deactivated(&a.endpoint).await;
    let conn = binder.bind(&proxy).await.unwrap();
    assert_eq!(conn.endpoint(), &b.endpoint);

    // Bring an adapter back on A's address and let the cooldown age out
    let listener = TcpListener::bind(("127.0.0.1", port_a)).await.unwrap();
    tokio::spawn(async move {
        loop {
            if listener.accept().await.is_err() {
                break;
            }
        }
    });
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Drop the pinned connection to B so the next bind re-runs selection
    binder.endpoint_deactivated(&b.endpoint).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    let conn = binder.bind(&proxy).await.unwrap();
    assert_eq!(conn.endpoint(), &a.endpoint);
}

/// Secure/insecure isolation: a secure proxy and a default proxy derived from
/// the same endpoint set never share a connection.
#[tokio::test]
async fn test_secure_and_insecure_do_not_share() {
    let tcp = Adapter::spawn().await;

    let ssl_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let ssl_endpoint = Endpoint::ssl("127.0.0.1", ssl_listener.local_addr().unwrap().port());
    tokio::spawn(async move {
        loop {
            if ssl_listener.accept().await.is_err() {
                break;
            }
        }
    });

    let binder = Binder::new(test_config());
    let plain = proxy_for(vec![tcp.endpoint.clone(), ssl_endpoint.clone()]);
    let secure = plain.with_secure(true);

    let insecure_conn = plain.get_connection(&binder).await.unwrap();
    let secure_conn = secure.get_connection(&binder).await.unwrap();

    // Default selection prefers the insecure endpoint
    assert_eq!(insecure_conn.endpoint(), &tcp.endpoint);
    assert_eq!(secure_conn.endpoint(), &ssl_endpoint);
    assert_ne!(insecure_conn.id(), secure_conn.id());

    // Both stay cached independently
    assert_eq!(binder.cache().len(), 2);
}

/// Datagram isolation: a datagram-derived proxy uses its own connection, and
/// a reply-expecting call over it is a mode mismatch, not a rebind.
#[tokio::test]
async fn test_datagram_isolation_and_mode_mismatch() {
    let tcp = Adapter::spawn().await;

    let udp_socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let udp_endpoint = Endpoint::udp("127.0.0.1", udp_socket.local_addr().unwrap().port());

    let binder = Binder::new(test_config());
    let twoway = proxy_for(vec![tcp.endpoint.clone(), udp_endpoint.clone()]);
    let datagram = twoway.with_datagram();

    let stream_conn = twoway.get_connection(&binder).await.unwrap();
    let datagram_conn = datagram.get_connection(&binder).await.unwrap();

    assert_eq!(stream_conn.endpoint(), &tcp.endpoint);
    assert_eq!(datagram_conn.endpoint(), &udp_endpoint);
    assert_ne!(stream_conn.id(), datagram_conn.id());

    assert!(matches!(
        datagram_conn.validate_mode(Mode::Twoway),
        Err(BindError::TwowayOnly)
    ));
    assert!(datagram_conn.validate_mode(Mode::Datagram).is_ok());
}

/// Connection-id partitioning: distinct connection ids force independent
/// connections to the same adapter.
#[tokio::test]
async fn test_connection_id_forces_separate_connections() {
    let adapter = Adapter::spawn().await;

    let binder = Binder::new(test_config());
    let base = proxy_for(vec![adapter.endpoint.clone()]);

    let c0 = base.get_connection(&binder).await.unwrap();
    let c1 = base
        .with_connection_id("one")
        .get_connection(&binder)
        .await
        .unwrap();
    let c2 = base
        .with_connection_id("two")
        .get_connection(&binder)
        .await
        .unwrap();

    assert_ne!(c0.id(), c1.id());
    assert_ne!(c1.id(), c2.id());
    assert_ne!(c0.id(), c2.id());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(adapter.accepted(), 3);
}
