//! Multi-peer test harness.
//!
//! One rendezvous point plus N peers wired together through a
//! [`MockNetwork`], with short timeouts so failure paths finish quickly.

use std::sync::Arc;
use std::time::Duration;

use market::mocks::{test_identity, MockNetwork, MockTime, MockTransport};
use market::{Identity, NodeConfig, PeerNode, Registry, RendezvousService};

pub type TestPeer = PeerNode<MockTransport, MockTime>;

pub fn fast_config() -> NodeConfig {
    NodeConfig {
        call_timeout: Duration::from_millis(300),
        notify_timeout: Duration::from_millis(150),
        max_retries: 3,
        retry_initial_delay: Duration::from_millis(10),
        ..NodeConfig::default()
    }
}

pub struct AuctionNetwork {
    pub network: MockNetwork,
    pub registry: Arc<Registry>,
    pub rendezvous: Identity,
    pub time: MockTime,
    peers: Vec<TestPeer>,
}

#[allow(dead_code)]
impl AuctionNetwork {
    /// Rendezvous point only; add peers with [`Self::spawn_peer`].
    pub fn new() -> Self {
        let network = MockNetwork::new();
        let registry = Arc::new(Registry::new());
        let rendezvous = test_identity(200);
        network.attach(rendezvous, Arc::new(RendezvousService::new(registry.clone())));
        Self {
            network,
            registry,
            rendezvous,
            time: MockTime::new(1_000),
            peers: Vec::new(),
        }
    }

    /// Start `n` peers and join them in order.
    pub async fn with_peers(n: usize) -> Self {
        let mut net = Self::new();
        for _ in 0..n {
            let index = net.spawn_peer();
            net.peers[index].join().await.unwrap();
        }
        net
    }

    /// Create and serve a peer without joining. Returns its index.
    pub fn spawn_peer(&mut self) -> usize {
        self.spawn_peer_with(fast_config())
    }

    pub fn spawn_peer_with(&mut self, config: NodeConfig) -> usize {
        let index = self.peers.len();
        let identity = test_identity(index as u8 + 1);
        let node = PeerNode::new(
            self.network.transport(identity),
            self.rendezvous,
            self.time.clone(),
            &config,
        );
        self.network.attach(identity, node.service());
        self.peers.push(node);
        index
    }

    pub fn peer(&self, index: usize) -> &TestPeer {
        &self.peers[index]
    }

    pub fn id(&self, index: usize) -> Identity {
        *self.peers[index].identity()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Wait for every peer's in-flight broadcasts.
    pub async fn settle(&self) {
        for peer in &self.peers {
            peer.coordinator().wait_for_broadcasts().await;
        }
    }
}
