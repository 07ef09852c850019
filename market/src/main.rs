//! `auction-node`: run the rendezvous point or an interactive auction peer.
//!
//! Logging goes to stderr; stdout carries command output only.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use market::node::commands::{self, UserCommand, HELP};
use market::{
    DhtResolver, DirectoryDht, FileStore, Identity, MarketResult, NodeConfig, NodeRole, OsRandom,
    PeerNode, Registry, RendezvousService, RpcServer, SessionSeeds, SystemTimeProvider,
    TcpTransport,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "auction-node", version, about = "Peer-to-peer auctions with a rendezvous registry")]
struct Cli {
    /// Seed store directory (defaults to the platform data dir).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Shared directory used to resolve identities to endpoints.
    #[arg(long, global = true)]
    directory: Option<PathBuf>,

    /// Address to accept remote calls on.
    #[arg(long, global = true, default_value = "127.0.0.1:0")]
    listen: SocketAddr,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the rendezvous registry and print its identity.
    Rendezvous,
    /// Join through a rendezvous point and read commands from stdin.
    Peer {
        /// Hex identity printed by the rendezvous node.
        #[arg(long)]
        rendezvous: String,
    },
}

fn init_logging_stderr() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}

fn load_config(cli: &Cli, role: NodeRole) -> MarketResult<NodeConfig> {
    let mut config = NodeConfig::from_env()?;
    match &cli.data_dir {
        Some(dir) => config.data_dir = dir.clone(),
        None => {
            let sub = match role {
                NodeRole::Rendezvous => "rendezvous",
                NodeRole::Peer => "peer",
            };
            config.data_dir = config.data_dir.join(sub);
        }
    }
    if let Some(dir) = &cli.directory {
        config.directory = dir.clone();
    }
    Ok(config)
}

/// Everything both roles set up before serving.
struct Endpoint {
    seeds: SessionSeeds,
    dht: DirectoryDht<SystemTimeProvider>,
}

async fn prepare(config: &NodeConfig, role: NodeRole) -> MarketResult<Endpoint> {
    let store = FileStore::open(&config.data_dir).await?;
    let seeds = SessionSeeds::load(&store, &OsRandom::new(), role).await?;
    let dht = DirectoryDht::open(&config.directory, SystemTimeProvider::new()).await?;
    Ok(Endpoint { seeds, dht })
}

async fn announce(endpoint: &Endpoint, server: &RpcServer) -> MarketResult<()> {
    endpoint
        .dht
        .announce(
            &endpoint.seeds.rpc_identity(),
            server.local_addr(),
            &endpoint.seeds.dht_identity(),
        )
        .await
}

async fn run_rendezvous(cli: &Cli) -> MarketResult<()> {
    let config = load_config(cli, NodeRole::Rendezvous)?;
    let endpoint = prepare(&config, NodeRole::Rendezvous).await?;
    let identity = endpoint.seeds.rpc_identity();

    let registry = Arc::new(Registry::new());
    let shutdown = CancellationToken::new();
    let server = RpcServer::start(
        cli.listen,
        identity,
        Arc::new(RendezvousService::new(registry.clone())),
        SystemTimeProvider::new(),
        shutdown.clone(),
    )
    .await?;
    announce(&endpoint, &server).await?;

    println!("{identity}");
    info!("Rendezvous ready at {}", server.local_addr());

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
    }
    info!("Shutting down with {} registered peers", registry.len());
    shutdown.cancel();
    server.join().await;
    if let Err(e) = endpoint.dht.withdraw(&identity).await {
        warn!("Failed to withdraw endpoint: {}", e);
    }
    Ok(())
}

async fn run_peer(cli: &Cli, rendezvous: &str) -> MarketResult<bool> {
    let rendezvous = Identity::from_hex(rendezvous)?;
    let config = load_config(cli, NodeRole::Peer)?;
    let endpoint = prepare(&config, NodeRole::Peer).await?;
    let identity = endpoint.seeds.rpc_identity();

    let transport = TcpTransport::new(
        endpoint.seeds.rpc.clone(),
        endpoint.dht.clone(),
        SystemTimeProvider::new(),
    );
    let node = PeerNode::new(transport, rendezvous, SystemTimeProvider::new(), &config);

    let shutdown = CancellationToken::new();
    let server = RpcServer::start(
        cli.listen,
        identity,
        node.service(),
        SystemTimeProvider::new(),
        shutdown.clone(),
    )
    .await?;
    announce(&endpoint, &server).await?;

    let joined = match node.join().await {
        Ok(peers) => {
            println!("joined as {identity} with {} peers", peers.len());
            println!("{HELP}");
            command_loop(&node).await;
            node.shutdown().await;
            true
        }
        Err(e) => {
            error!("Joining through rendezvous {} failed: {}", rendezvous.short(), e);
            false
        }
    };

    shutdown.cancel();
    server.join().await;
    if let Err(e) = endpoint.dht.withdraw(&identity).await {
        warn!("Failed to withdraw endpoint: {}", e);
    }
    Ok(joined)
}

async fn command_loop<T, C>(node: &PeerNode<T, C>)
where
    T: market::RpcTransport,
    C: market::TimeProvider,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            },
        };

        match UserCommand::parse(&line) {
            Ok(None) => {}
            Ok(Some(UserCommand::Quit)) => break,
            Ok(Some(command)) => match commands::execute(node, command).await {
                Ok(output) => println!("{output}"),
                Err(e) => println!("error: {e}"),
            },
            Err(e) => println!("error: {e}"),
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging_stderr();
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Rendezvous => run_rendezvous(&cli).await.map(|()| true),
        Command::Peer { rendezvous } => run_peer(&cli, rendezvous).await,
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
