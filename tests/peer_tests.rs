//! End-to-End Peer Tests
//!
//! Runs real nodes on local sockets and checks how misses travel between them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use peercache::{
    api::create_router, AppState, CacheError, Group, GroupRegistry, PeerGetter, PeerPool,
};
use tokio::net::TcpListener;

// == Helper Functions ==

struct Node {
    url: String,
    group: Arc<Group>,
    pool: Arc<PeerPool>,
    loads: Arc<AtomicUsize>,
}

/// Binds a listener on an ephemeral port and returns it with its URL.
async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    (listener, url)
}

/// Starts a node serving group "scores" whose loader tags values with the node URL.
fn start_node(listener: TcpListener, url: String, peers: &[String]) -> Node {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    let origin = url.clone();

    let registry = Arc::new(GroupRegistry::new());
    let group = registry
        .create(
            Group::builder("scores")
                .cache_bytes(2 << 10)
                .loader_fn(move |key| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(format!("{}@{}", key, origin).into_bytes())
                }),
        )
        .unwrap();

    let pool = Arc::new(PeerPool::new(url.clone()));
    pool.set_peers(peers.to_vec());
    group.register_peers(pool.clone()).unwrap();

    let app = create_router(AppState::new(registry, pool.clone()));
    tokio::spawn(async move { axum::serve(listener, app).await });

    Node {
        url,
        group,
        pool,
        loads,
    }
}

/// A key the ring assigns to `owner`.
fn key_owned_by(pool: &PeerPool, owner: &str) -> String {
    (0..1000)
        .map(|i| format!("key{}", i))
        .find(|key| pool.owner_of(key).as_deref() == Some(owner))
        .expect("no key maps to owner")
}

// == Tests ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_miss_is_fetched_from_owner() {
    let (listener_a, url_a) = bind().await;
    let (listener_b, url_b) = bind().await;
    let peers = vec![url_a.clone(), url_b.clone()];

    let a = start_node(listener_a, url_a, &peers);
    let b = start_node(listener_b, url_b, &peers);

    let key = key_owned_by(&a.pool, &b.url);
    let view = a.group.get(&key).await.unwrap();

    assert_eq!(view.as_string(), format!("{}@{}", key, b.url));
    assert_eq!(a.loads.load(Ordering::SeqCst), 0);
    assert_eq!(b.loads.load(Ordering::SeqCst), 1);

    // Only the owner caches the value
    assert!(a.group.cache().get(&key).is_none());
    assert!(b.group.cache().get(&key).is_some());
    assert_eq!(a.group.stats().peer_loads, 1);
    assert_eq!(b.group.stats().server_requests, 1);

    // A second lookup goes back to the owner, which answers from its cache
    a.group.get(&key).await.unwrap();
    assert_eq!(b.loads.load(Ordering::SeqCst), 1);
    assert_eq!(b.group.stats().cache_hits, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_owned_key_is_loaded_locally() {
    let (listener_a, url_a) = bind().await;
    let (listener_b, url_b) = bind().await;
    let peers = vec![url_a.clone(), url_b.clone()];

    let a = start_node(listener_a, url_a, &peers);
    let b = start_node(listener_b, url_b, &peers);

    let key = key_owned_by(&a.pool, &a.url);
    let view = a.group.get(&key).await.unwrap();

    assert_eq!(view.as_string(), format!("{}@{}", key, a.url));
    assert_eq!(a.loads.load(Ordering::SeqCst), 1);
    assert_eq!(b.loads.load(Ordering::SeqCst), 0);
    assert!(a.group.cache().get(&key).is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_trailing_slash_urls_serve_own_keys_locally() {
    let (listener_a, url_a) = bind().await;
    let (listener_b, url_b) = bind().await;
    let peers = vec![format!("{}/", url_a), format!("{}/", url_b)];

    let a = start_node(listener_a, format!("{}/", url_a), &peers);
    let b = start_node(listener_b, format!("{}/", url_b), &peers);
    assert_eq!(a.pool.self_url(), url_a);

    let key = key_owned_by(&a.pool, &url_a);
    let view = tokio::time::timeout(Duration::from_secs(3), a.group.get(&key))
        .await
        .expect("lookup of an owned key stalled")
        .unwrap();

    assert_eq!(view.as_string(), format!("{}@{}", key, a.url));
    assert_eq!(a.loads.load(Ordering::SeqCst), 1);
    assert_eq!(a.group.stats().peer_loads, 0);
    assert_eq!(b.group.stats().server_requests, 0);

    // Remote keys still reach the other node through a single-slash URL
    let key = key_owned_by(&a.pool, &url_b);
    let view = tokio::time::timeout(Duration::from_secs(3), a.group.get(&key))
        .await
        .expect("remote lookup stalled")
        .unwrap();
    assert_eq!(view.as_string(), format!("{}@{}", key, b.url));
    assert_eq!(b.loads.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unreachable_owner_falls_back_to_loader() {
    let (listener_a, url_a) = bind().await;
    // Reserve a port, then free it so nothing listens there
    let (dead_listener, dead_url) = bind().await;
    drop(dead_listener);

    let peers = vec![url_a.clone(), dead_url.clone()];
    let a = start_node(listener_a, url_a, &peers);

    let key = key_owned_by(&a.pool, &dead_url);
    let view = a.group.get(&key).await.unwrap();

    assert_eq!(view.as_string(), format!("{}@{}", key, a.url));
    assert_eq!(a.loads.load(Ordering::SeqCst), 1);
    assert!(a.group.cache().get(&key).is_some());
    assert_eq!(a.group.stats().peer_errors, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_http_getter_reports_non_200() {
    let (listener_b, url_b) = bind().await;
    let b = start_node(listener_b, url_b.clone(), &[url_b.clone()]);

    let getter = peercache::peers::HttpGetter::new(
        format!("{}/_geecache/", b.url),
        reqwest::Client::new(),
    );

    let value = getter.fetch("scores", "Tom").await.unwrap();
    assert_eq!(String::from_utf8(value).unwrap(), format!("Tom@{}", b.url));

    let err = getter.fetch("nogroup", "Tom").await.unwrap_err();
    match err {
        CacheError::Peer(msg) => assert!(msg.contains("404"), "{}", msg),
        other => panic!("expected peer error, got {:?}", other),
    }
}
