//! Parley node binary.
//!
//! Composes the core library into a running node with an interactive menu.

mod cli;
mod menu;

use std::collections::HashSet;

use tracing_subscriber::EnvFilter;

use parley_p2p::{bootstrap, MeshNode, NodeConfig, PeerAddr};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    tracing::info!("Parley Node v{}", env!("CARGO_PKG_VERSION"));

    // Assemble the bootstrap peer list: baked-in, CLI, peers file.
    let mut peers: Vec<PeerAddr> = NodeConfig::static_peers();
    if let Some(cli_peers) = &cli.peer {
        peers.extend(cli_peers.iter().copied());
    }
    if let Some(path) = &cli.peers_file {
        peers.extend(bootstrap::load_peers(path).await?);
    }
    let mut seen = HashSet::new();
    peers.retain(|p| seen.insert(*p));

    let mut config = NodeConfig::new(cli.name, cli.listen.port())
        .with_bind_addr(cli.listen)
        .with_bootstrap_peers(peers);
    if let Some(ip) = cli.advertise_ip {
        config = config.with_advertise_ip(ip);
    }

    let (node, mut events) = MeshNode::start(config).await?;
    println!(
        "Node '{}' listening on {} (announcing {})",
        node.display_name(),
        node.local_addr(),
        node.self_addr()
    );

    // Render node events as they arrive, interleaved with the menu.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            println!("{}", event);
        }
    });

    menu::run(&node).await
}
