//! Node configuration.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::membership::PeerAddr;

/// Maximum bytes read from one accepted connection. Anything past this is
/// discarded with the connection.
pub const MAX_FRAME_SIZE: usize = 1024;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 7401;

/// Default timeout for establishing outbound connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for liveness probes.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default display name when none is configured.
pub const DEFAULT_DISPLAY_NAME: &str = "anonymous";

/// Baked-in bootstrap peers, contacted once at startup.
///
/// Add fixed `ip:port` entries here when deploying a standing mesh; most
/// setups supply peers via configuration instead.
pub const STATIC_PEERS: &[&str] = &[
    // "203.0.113.10:7401",
    // "203.0.113.11:7401",
];

/// Configuration for a mesh node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Display name announced in every outbound frame.
    pub display_name: String,

    /// Address to bind the listener to.
    pub bind_addr: SocketAddr,

    /// IP to advertise in outbound frames. When `None`, the node picks the
    /// local interface address and falls back to loopback.
    pub advertise_ip: Option<IpAddr>,

    /// Peers to send a connect handshake to on startup.
    pub bootstrap_peers: Vec<PeerAddr>,

    /// Timeout for establishing outbound connections.
    pub connect_timeout: Duration,

    /// Timeout for liveness probes.
    pub probe_timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            advertise_ip: None,
            bootstrap_peers: Vec::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl NodeConfig {
    /// Create a configuration with the given display name and listen port,
    /// bound on all interfaces.
    pub fn new(display_name: impl Into<String>, port: u16) -> Self {
        Self {
            display_name: display_name.into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            ..Default::default()
        }
    }

    /// Set the full bind address (useful for tests binding loopback port 0).
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the IP advertised in outbound frames.
    pub fn with_advertise_ip(mut self, ip: IpAddr) -> Self {
        self.advertise_ip = Some(ip);
        self
    }

    /// Add bootstrap peers to contact on startup.
    pub fn with_bootstrap_peers(mut self, peers: Vec<PeerAddr>) -> Self {
        self.bootstrap_peers = peers;
        self
    }

    /// Set the outbound connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the liveness probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Bootstrap peers baked into the build, parsed.
    pub fn static_peers() -> Vec<PeerAddr> {
        STATIC_PEERS
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(config.display_name, DEFAULT_DISPLAY_NAME);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.probe_timeout, DEFAULT_PROBE_TIMEOUT);
        assert!(config.bootstrap_peers.is_empty());
        assert!(config.advertise_ip.is_none());
    }

    #[test]
    fn test_config_builder() {
        let peers = vec!["10.0.0.1:7401".parse().unwrap()];
        let config = NodeConfig::new("alice", 5001)
            .with_advertise_ip("127.0.0.1".parse().unwrap())
            .with_bootstrap_peers(peers.clone())
            .with_probe_timeout(Duration::from_millis(500));

        assert_eq!(config.display_name, "alice");
        assert_eq!(config.bind_addr.port(), 5001);
        assert_eq!(config.advertise_ip, Some("127.0.0.1".parse().unwrap()));
        assert_eq!(config.bootstrap_peers, peers);
        assert_eq!(config.probe_timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_static_peers_parse() {
        // Placeholder list must stay parseable when entries are added.
        for entry in STATIC_PEERS {
            assert!(
                entry.parse::<PeerAddr>().is_ok(),
                "unparseable static peer: {}",
                entry
            );
        }
    }
}
