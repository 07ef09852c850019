//! Network failures around discovery, bidding and notification.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use market::{Identity, MarketError, MarketResult, Method, RendezvousService, RpcHandler};

use crate::common::{fast_config, AuctionNetwork};

#[tokio::test]
async fn test_join_fails_when_rendezvous_is_down() {
    let mut net = AuctionNetwork::new();
    let index = net.spawn_peer();
    net.network.set_unreachable(net.rendezvous, true);

    let result = net.peer(index).join().await;
    assert!(matches!(result, Err(MarketError::PeerUnreachable(_))));
    // Every attempt was made before giving up.
    assert_eq!(
        net.network.count_calls(&net.rendezvous, Method::Register),
        fast_config().max_retries as usize
    );
    assert!(net.registry.is_empty());
}

#[tokio::test]
async fn test_unreachable_peer_does_not_stall_broadcast() {
    let net = AuctionNetwork::with_peers(4).await;
    let seller = net.id(0);
    net.network.set_unreachable(net.id(2), true);
    net.network.set_delay(net.id(3), Duration::from_secs(60));

    net.peer(0).open_auction("lamp").await.unwrap();
    net.peer(1).submit_bid(&seller, 5).await.unwrap();

    let reports = tokio::time::timeout(
        Duration::from_secs(5),
        net.peer(0).coordinator().wait_for_broadcasts(),
    )
    .await
    .unwrap();
    for report in &reports {
        assert_eq!(report.delivered, vec![net.id(1)]);
        assert_eq!(report.failed.len(), 2);
    }
    assert_eq!(net.peer(1).inbox().from_seller(&seller).len(), 2);
}

#[tokio::test]
async fn test_bid_to_slow_seller_times_out_without_retry() {
    let net = AuctionNetwork::with_peers(2).await;
    let seller = net.id(0);
    net.peer(0).open_auction("lamp").await.unwrap();
    net.network.set_delay(seller, Duration::from_secs(60));

    let result = net.peer(1).submit_bid(&seller, 5).await;
    assert!(matches!(result, Err(MarketError::Timeout(_))));
    assert_eq!(net.network.count_calls(&seller, Method::SubmitBid), 1);
}

#[tokio::test]
async fn test_bid_to_unknown_seller_is_unreachable() {
    let net = AuctionNetwork::with_peers(2).await;
    let ghost = market::mocks::test_identity(99);

    let result = net.peer(1).submit_bid(&ghost, 5).await;
    assert!(matches!(result, Err(MarketError::PeerUnreachable(_))));
}

#[tokio::test]
async fn test_shutdown_survives_rendezvous_outage() {
    let net = AuctionNetwork::with_peers(2).await;
    net.network.set_unreachable(net.rendezvous, true);

    tokio::time::timeout(Duration::from_secs(5), net.peer(0).shutdown())
        .await
        .unwrap();
    assert_eq!(net.registry.len(), 2);
}

#[tokio::test]
async fn test_deregister_on_close() {
    let mut net = AuctionNetwork::with_peers(1).await;
    let seller = net.spawn_peer_with(market::NodeConfig {
        deregister_on_close: true,
        ..fast_config()
    });
    net.peer(seller).join().await.unwrap();

    net.peer(seller).open_auction("lamp").await.unwrap();
    net.peer(seller).close_auction().await.unwrap();

    assert_eq!(net.registry.list_peers(), vec![net.id(0)]);
}

/// Rendezvous that accepts registrations but cannot list peers.
struct BrokenListing(RendezvousService);

#[async_trait]
impl RpcHandler for BrokenListing {
    async fn handle(
        &self,
        caller: Identity,
        method: Method,
        payload: Vec<u8>,
    ) -> MarketResult<Vec<u8>> {
        match method {
            Method::Peers => Err(MarketError::Protocol("listing unavailable".to_string())),
            _ => self.0.handle(caller, method, payload).await,
        }
    }
}

#[tokio::test]
async fn test_failed_join_withdraws_registration() {
    let mut net = AuctionNetwork::new();
    net.network.attach(
        net.rendezvous,
        Arc::new(BrokenListing(RendezvousService::new(net.registry.clone()))),
    );
    let index = net.spawn_peer();

    let result = net.peer(index).join().await;
    assert!(matches!(result, Err(MarketError::Protocol(_))));
    assert!(net.registry.is_empty());
    assert_eq!(net.network.count_calls(&net.rendezvous, Method::Closing), 1);
}

#[tokio::test]
async fn test_bid_to_departed_seller_is_unreachable() {
    let net = AuctionNetwork::with_peers(2).await;
    let seller = net.id(0);
    net.peer(0).open_auction("lamp").await.unwrap();
    net.network.detach(&seller);

    let result = net.peer(1).submit_bid(&seller, 5).await;
    assert!(matches!(result, Err(MarketError::PeerUnreachable(_))));
}
