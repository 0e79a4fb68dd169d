//! Command-line argument parsing.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use parley_p2p::PeerAddr;

/// Parley presence and messaging node.
#[derive(Parser, Debug, Clone)]
#[command(name = "parley-node")]
#[command(about = "Peer-to-peer presence and messaging node")]
#[command(version)]
pub struct Cli {
    /// Display name announced to peers.
    #[arg(long, default_value = "anonymous")]
    pub name: String,

    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:7401")]
    pub listen: SocketAddr,

    /// Comma-separated list of bootstrap peers (ip:port).
    #[arg(long, value_delimiter = ',')]
    pub peer: Option<Vec<PeerAddr>>,

    /// JSON file with additional bootstrap peers.
    #[arg(long)]
    pub peers_file: Option<PathBuf>,

    /// IP to advertise in outbound frames (defaults to the local interface
    /// address).
    #[arg(long)]
    pub advertise_ip: Option<IpAddr>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
