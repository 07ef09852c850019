//! Larger auctions: many concurrent bidders against one seller.

use std::sync::Arc;

use market::{AuctionEvent, MarketError};

use crate::common::AuctionNetwork;

#[tokio::test]
async fn test_ten_concurrent_bidders() {
    let net = Arc::new(AuctionNetwork::with_peers(10).await);
    let seller = net.id(0);
    net.peer(0).open_auction("painting").await.unwrap();

    let mut bids = tokio::task::JoinSet::new();
    for index in 1..net.len() {
        let net = net.clone();
        bids.spawn(async move { net.peer(index).submit_bid(&seller, index as u64 * 10).await });
    }
    while let Some(result) = bids.join_next().await {
        result.unwrap().unwrap();
    }

    let status = net.peer(0).auction_status(&seller).await.unwrap().unwrap();
    assert_eq!(status.bid_count, 9);

    let outcome = net.peer(0).close_auction().await.unwrap();
    let winner = outcome.winner().unwrap();
    assert_eq!((winner.bidder, winner.amount), (net.id(9), 90));

    net.settle().await;
    for index in 1..net.len() {
        let closed = net
            .peer(index)
            .inbox()
            .from_seller(&seller)
            .iter()
            .any(|n| matches!(n.event, AuctionEvent::Closed { .. }));
        assert!(closed, "peer {index} missed the closure");
    }
}

#[tokio::test]
async fn test_equal_amounts_go_to_the_earlier_bid() {
    let net = AuctionNetwork::with_peers(4).await;
    let seller = net.id(0);
    net.peer(0).open_auction("clock").await.unwrap();

    net.peer(1).submit_bid(&seller, 10).await.unwrap();
    net.peer(2).submit_bid(&seller, 15).await.unwrap();
    net.peer(3).submit_bid(&seller, 15).await.unwrap();

    let outcome = net.peer(0).close_auction().await.unwrap();
    let winner = outcome.winner().unwrap();
    assert_eq!(winner.bidder, net.id(2));
    assert_eq!(winner.sequence, 2);
}

#[tokio::test]
async fn test_several_sellers_run_independent_auctions() {
    let net = AuctionNetwork::with_peers(4).await;
    let (a, b) = (net.id(0), net.id(1));

    net.peer(0).open_auction("boat").await.unwrap();
    net.peer(1).open_auction("car").await.unwrap();

    net.peer(2).submit_bid(&a, 100).await.unwrap();
    net.peer(3).submit_bid(&b, 40).await.unwrap();
    net.peer(1).submit_bid(&a, 120).await.unwrap();
    net.peer(0).submit_bid(&b, 30).await.unwrap();

    let boat = net.peer(0).close_auction().await.unwrap();
    let car = net.peer(1).close_auction().await.unwrap();
    assert_eq!(boat.winner().map(|w| w.bidder), Some(b));
    assert_eq!(car.winner().map(|w| w.bidder), Some(net.id(3)));

    // Seller a's auction being closed does not affect b's.
    assert!(matches!(
        net.peer(2).submit_bid(&a, 500).await,
        Err(MarketError::AuctionNotOpen)
    ));
}
