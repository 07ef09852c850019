//! Rendezvous registration through the remote-call surface.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use market::mocks::{test_identity, RecordedCall};
use market::Method;

use crate::common::AuctionNetwork;

#[tokio::test]
async fn test_join_returns_everyone_but_self() {
    let mut net = AuctionNetwork::with_peers(2).await;
    let late = net.spawn_peer();

    let peers: HashSet<_> = net.peer(late).join().await.unwrap().into_iter().collect();
    assert_eq!(peers, HashSet::from([net.id(0), net.id(1)]));
    assert_eq!(net.registry.len(), 3);
}

#[tokio::test]
async fn test_rejoining_is_idempotent() {
    let net = AuctionNetwork::with_peers(2).await;
    let version = net.registry.snapshot().version;

    net.peer(0).join().await.unwrap();
    net.peer(0).join().await.unwrap();

    let snapshot = net.registry.snapshot();
    assert_eq!(snapshot.peers.len(), 2);
    assert_eq!(snapshot.version, version);
}

#[tokio::test]
async fn test_shutdown_deregisters() {
    let net = AuctionNetwork::with_peers(3).await;

    net.peer(1).shutdown().await;

    let remaining: HashSet<_> = net.registry.list_peers().into_iter().collect();
    assert_eq!(remaining, HashSet::from([net.id(0), net.id(2)]));
    assert_eq!(net.network.count_calls(&net.rendezvous, Method::Closing), 1);
}

#[tokio::test]
async fn test_refresh_sees_late_joiners_and_leavers() {
    let mut net = AuctionNetwork::with_peers(2).await;
    assert!(net.peer(0).known_peers().is_empty());
    assert_eq!(net.peer(0).refresh_peers().await.unwrap(), vec![net.id(1)]);

    let late = net.spawn_peer();
    net.peer(late).join().await.unwrap();
    net.peer(1).shutdown().await;

    let refreshed: HashSet<_> = net.peer(0).refresh_peers().await.unwrap().into_iter().collect();
    assert_eq!(refreshed, HashSet::from([net.id(late)]));
}

#[tokio::test]
async fn test_concurrent_joins_all_land() {
    let mut net = AuctionNetwork::new();
    for _ in 0..16 {
        net.spawn_peer();
    }
    let net = Arc::new(net);

    let mut joins = tokio::task::JoinSet::new();
    for index in 0..net.len() {
        let net = net.clone();
        joins.spawn(async move { net.peer(index).join().await });
    }
    while let Some(result) = joins.join_next().await {
        result.unwrap().unwrap();
    }

    let listed: HashSet<_> = net.registry.list_peers().into_iter().collect();
    let expected: HashSet<_> = (0..16u8).map(|i| test_identity(i + 1)).collect();
    assert_eq!(listed, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_leave_after_concurrent_joins_converges() {
    for _ in 0..50 {
        let mut net = AuctionNetwork::new();
        let (a, b) = (net.spawn_peer(), net.spawn_peer());
        let net = Arc::new(net);
        let leaver = net.id(a);

        let mut tasks = tokio::task::JoinSet::new();
        for index in [a, b] {
            let net = net.clone();
            tasks.spawn(async move {
                net.peer(index).join().await.unwrap();
            });
        }
        let closer = net.clone();
        tasks.spawn(async move {
            // Leave only once the registration is visible.
            while !closer.registry.contains(&leaver) {
                tokio::task::yield_now().await;
            }
            closer.peer(a).shutdown().await;
        });

        tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(result) = tasks.join_next().await {
                result.unwrap();
            }
        })
        .await
        .unwrap();

        assert_eq!(net.registry.list_peers(), vec![net.id(b)]);
        let closings: Vec<RecordedCall> = net
            .network
            .calls()
            .into_iter()
            .filter(|call| call.method == Method::Closing)
            .collect();
        assert_eq!(
            closings,
            vec![RecordedCall {
                from: leaver,
                to: net.rendezvous,
                method: Method::Closing
            }]
        );
    }
}
