//! The full protocol over real sockets on 127.0.0.1, with endpoints
//! resolved through a shared directory.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use market::mocks::test_keypair;
use market::{
    AuctionEvent, DhtResolver, DirectoryDht, NodeKeypair, PeerNode, Registry, RendezvousService,
    RpcHandler, RpcServer, SystemTimeProvider, TcpTransport,
};
use tokio_util::sync::CancellationToken;

use crate::common::fast_config;

type TcpPeer = PeerNode<TcpTransport<DirectoryDht<SystemTimeProvider>, SystemTimeProvider>, SystemTimeProvider>;

fn loopback() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

async fn serve(
    keypair: &NodeKeypair,
    handler: Arc<dyn RpcHandler>,
    dht: &DirectoryDht<SystemTimeProvider>,
    shutdown: &CancellationToken,
) -> RpcServer {
    let identity = keypair.identity();
    let server = RpcServer::start(
        loopback(),
        identity,
        handler,
        SystemTimeProvider::new(),
        shutdown.clone(),
    )
    .await
    .unwrap();
    dht.announce(&identity, server.local_addr(), &identity)
        .await
        .unwrap();
    server
}

async fn start_peer(
    n: u8,
    rendezvous: &NodeKeypair,
    dht: &DirectoryDht<SystemTimeProvider>,
    shutdown: &CancellationToken,
) -> (TcpPeer, RpcServer) {
    let keypair = test_keypair(n);
    let mut config = fast_config();
    config.call_timeout = Duration::from_secs(2);
    config.notify_timeout = Duration::from_secs(1);
    let node = PeerNode::new(
        TcpTransport::new(keypair.clone(), dht.clone(), SystemTimeProvider::new()),
        rendezvous.identity(),
        SystemTimeProvider::new(),
        &config,
    );
    let server = serve(&keypair, node.service(), dht, shutdown).await;
    (node, server)
}

#[tokio::test]
async fn test_widget_auction_over_tcp() {
    let dir = tempfile::tempdir().unwrap();
    let dht = DirectoryDht::open(dir.path(), SystemTimeProvider::new())
        .await
        .unwrap();
    let shutdown = CancellationToken::new();

    let rendezvous = test_keypair(200);
    let registry = Arc::new(Registry::new());
    let rendezvous_server = serve(
        &rendezvous,
        Arc::new(RendezvousService::new(registry.clone())),
        &dht,
        &shutdown,
    )
    .await;

    let mut peers = Vec::new();
    let mut servers = vec![rendezvous_server];
    for n in 1..=3 {
        let (node, server) = start_peer(n, &rendezvous, &dht, &shutdown).await;
        node.join().await.unwrap();
        peers.push(node);
        servers.push(server);
    }
    assert_eq!(registry.len(), 3);

    let seller = *peers[0].identity();
    peers[0].open_auction("widget").await.unwrap();
    peers[1].submit_bid(&seller, 5).await.unwrap();
    peers[2].submit_bid(&seller, 8).await.unwrap();
    let outcome = peers[0].close_auction().await.unwrap();
    assert_eq!(outcome.winner().map(|b| b.amount), Some(8));
    assert_eq!(outcome.winner().map(|b| b.bidder), Some(*peers[2].identity()));

    peers[0].coordinator().wait_for_broadcasts().await;
    // Notifications are one-way; give the receivers a moment to process.
    for peer in &peers[1..] {
        let mut closed = false;
        for _ in 0..50 {
            closed = peer
                .inbox()
                .from_seller(&seller)
                .iter()
                .any(|n| matches!(n.event, AuctionEvent::Closed { .. }));
            if closed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(closed, "closure notification never arrived");
    }

    for peer in &peers {
        peer.shutdown().await;
    }
    assert!(registry.is_empty());

    shutdown.cancel();
    for server in servers {
        server.join().await;
    }
}
