//! The basic three-peer auction from discovery to announced winner.

use std::collections::HashSet;

use market::{AuctionEvent, AuctionStatus, MarketError};

use crate::common::AuctionNetwork;

#[tokio::test]
async fn test_widget_auction_end_to_end() {
    let net = AuctionNetwork::with_peers(3).await;
    let (p1, p2, p3) = (net.id(0), net.id(1), net.id(2));

    let listed: HashSet<_> = net.registry.list_peers().into_iter().collect();
    assert_eq!(listed, HashSet::from([p1, p2, p3]));

    net.peer(0).open_auction("widget").await.unwrap();
    net.peer(1).submit_bid(&p1, 5).await.unwrap();
    net.peer(2).submit_bid(&p1, 8).await.unwrap();

    let outcome = net.peer(0).close_auction().await.unwrap();
    let winner = outcome.winner().unwrap();
    assert_eq!((winner.bidder, winner.amount), (p3, 8));

    net.settle().await;
    for bidder in [1, 2] {
        let closed = net
            .peer(bidder)
            .inbox()
            .from_seller(&p1)
            .into_iter()
            .find(|n| matches!(n.event, AuctionEvent::Closed { .. }))
            .unwrap_or_else(|| panic!("peer {bidder} missed the closure"));
        assert_eq!(closed.item, "widget");
        assert_eq!(closed.event, AuctionEvent::Closed { outcome: outcome.clone() });
    }
    // The seller never notifies itself.
    assert!(net.peer(0).inbox().from_seller(&p1).is_empty());
}

#[tokio::test]
async fn test_bidders_can_poll_instead_of_waiting_for_notifications() {
    let net = AuctionNetwork::with_peers(3).await;
    let seller = net.id(0);

    net.peer(0).open_auction("widget").await.unwrap();
    net.peer(1).submit_bid(&seller, 5).await.unwrap();

    let status = net.peer(2).auction_status(&seller).await.unwrap().unwrap();
    assert_eq!(status.status, AuctionStatus::Open);
    assert_eq!(status.bid_count, 1);
    assert_eq!(status.high_bid.map(|b| b.amount), Some(5));

    net.peer(0).close_auction().await.unwrap();
    let status = net.peer(2).auction_status(&seller).await.unwrap().unwrap();
    assert_eq!(status.status, AuctionStatus::Closed);
    assert_eq!(
        status.outcome.and_then(|o| o.winner().map(|b| b.bidder)),
        Some(net.id(1))
    );
}

#[tokio::test]
async fn test_bid_after_close_is_rejected_remotely() {
    let net = AuctionNetwork::with_peers(3).await;
    let seller = net.id(0);

    net.peer(0).open_auction("widget").await.unwrap();
    net.peer(0).close_auction().await.unwrap();

    let late = net.peer(1).submit_bid(&seller, 50).await;
    assert!(matches!(late, Err(MarketError::AuctionNotOpen)));
}

#[tokio::test]
async fn test_every_bid_is_announced() {
    let net = AuctionNetwork::with_peers(3).await;
    let seller = net.id(0);

    net.peer(0).open_auction("widget").await.unwrap();
    net.peer(1).submit_bid(&seller, 5).await.unwrap();
    net.peer(2).submit_bid(&seller, 8).await.unwrap();
    net.settle().await;

    let seen: Vec<_> = net
        .peer(1)
        .inbox()
        .from_seller(&seller)
        .into_iter()
        .filter_map(|n| match n.event {
            AuctionEvent::NewBid { bid, high_bid } => Some((bid.amount, high_bid.amount)),
            _ => None,
        })
        .collect();
    assert_eq!(seen.len(), 2);
    assert!(seen.contains(&(5, 5)));
    assert!(seen.contains(&(8, 8)));
}
