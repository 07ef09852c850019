//! Boundary behavior of the auction surface.

use market::mocks::test_identity;
use market::{util, AuctionOutcome, AuctionStatus, MarketError, Method, RpcTransport};

use crate::common::AuctionNetwork;

#[tokio::test]
async fn test_close_without_bids_reports_no_bids() {
    let net = AuctionNetwork::with_peers(2).await;
    net.peer(0).open_auction("nothing").await.unwrap();

    let outcome = net.peer(0).close_auction().await.unwrap();
    assert_eq!(outcome, AuctionOutcome::NoBids);
}

#[tokio::test]
async fn test_seller_cannot_bid_on_own_auction() {
    let net = AuctionNetwork::with_peers(2).await;
    let seller = net.id(0);

    // Checked before the auction even exists.
    assert!(matches!(
        net.peer(0).submit_bid(&seller, 10).await,
        Err(MarketError::SelfBiddingNotAllowed)
    ));

    net.peer(0).open_auction("vase").await.unwrap();
    assert!(matches!(
        net.peer(0).submit_bid(&seller, 10).await,
        Err(MarketError::SelfBiddingNotAllowed)
    ));
}

#[tokio::test]
async fn test_zero_amount_is_rejected() {
    let net = AuctionNetwork::with_peers(2).await;
    let seller = net.id(0);
    net.peer(0).open_auction("vase").await.unwrap();

    assert!(matches!(
        net.peer(1).submit_bid(&seller, 0).await,
        Err(MarketError::NonPositiveAmount)
    ));
    let status = net.peer(1).auction_status(&seller).await.unwrap().unwrap();
    assert_eq!(status.bid_count, 0);
}

#[tokio::test]
async fn test_bid_before_open_is_rejected() {
    let net = AuctionNetwork::with_peers(2).await;
    assert!(matches!(
        net.peer(1).submit_bid(&net.id(0), 3).await,
        Err(MarketError::AuctionNotOpen)
    ));
    assert!(net.peer(1).auction_status(&net.id(0)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_reopen_after_close_starts_fresh() {
    let net = AuctionNetwork::with_peers(2).await;
    let seller = net.id(0);

    net.peer(0).open_auction("first").await.unwrap();
    net.peer(1).submit_bid(&seller, 7).await.unwrap();
    assert!(matches!(
        net.peer(0).open_auction("second").await,
        Err(MarketError::AlreadyOpen)
    ));
    net.peer(0).close_auction().await.unwrap();

    let reopened = net.peer(0).open_auction("second").await.unwrap();
    assert_eq!(reopened.item, "second");
    assert_eq!(reopened.status, AuctionStatus::Open);
    assert_eq!(reopened.bid_count, 0);
}

#[tokio::test]
async fn test_remote_open_is_refused() {
    let net = AuctionNetwork::with_peers(2).await;
    let item = util::encode(&"stolen".to_string()).unwrap();

    let result = net
        .network
        .transport(net.id(1))
        .call(&net.id(0), Method::OpenAuction, item)
        .await;
    assert!(matches!(result, Err(MarketError::Unauthorized(_))));
    assert!(net.peer(0).auction_status(&net.id(0)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unregistered_bidder_can_still_bid() {
    let mut net = AuctionNetwork::with_peers(2).await;
    let seller = net.id(0);
    let outsider = net.spawn_peer();
    net.peer(0).open_auction("vase").await.unwrap();

    net.peer(outsider).submit_bid(&seller, 4).await.unwrap();

    let status = net.peer(0).auction_status(&seller).await.unwrap().unwrap();
    assert_eq!(status.high_bid.map(|b| b.bidder), Some(test_identity(3)));
}

#[tokio::test]
async fn test_oversized_item_never_opens() {
    let net = AuctionNetwork::with_peers(2).await;
    let seller = net.id(0);

    let result = net.peer(0).open_auction(&"x".repeat(70_000)).await;
    assert!(matches!(result, Err(MarketError::InvalidItem(_))));
    assert!(net.peer(1).auction_status(&seller).await.unwrap().is_none());
    assert!(net.peer(1).notifications().is_empty());

    net.peer(0).open_auction("lamp").await.unwrap();
    net.settle().await;
    let status = net.peer(1).auction_status(&seller).await.unwrap().unwrap();
    assert_eq!(status.item, "lamp");
    assert_eq!(net.peer(1).notifications().len(), 1);
}
