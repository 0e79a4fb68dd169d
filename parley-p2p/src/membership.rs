//! The membership table: the node's authoritative view of reachable peers.

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Identity of a remote peer: the (ip, port) pair it listens on.
///
/// This is the address a peer *announces* in its frames, not the ephemeral
/// source address of any particular connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerAddr {
    /// IP the peer listens on.
    pub ip: IpAddr,
    /// Port the peer listens on.
    pub port: u16,
}

impl PeerAddr {
    /// Construct from parts.
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }

    /// The connectable socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl From<SocketAddr> for PeerAddr {
    fn from(addr: SocketAddr) -> Self {
        Self {
            ip: addr.ip(),
            port: addr.port(),
        }
    }
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SocketAddr handles the IPv6 bracket form.
        write!(f, "{}", self.socket_addr())
    }
}

impl FromStr for PeerAddr {
    type Err = std::net::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<SocketAddr>().map(PeerAddr::from)
    }
}

/// A known peer: its announced address and display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    /// Announced listening address.
    pub addr: PeerAddr,
    /// Display name from the peer's most recent frame.
    pub name: String,
}

impl PeerRecord {
    /// Construct a record.
    pub fn new(addr: PeerAddr, name: impl Into<String>) -> Self {
        Self {
            addr,
            name: name.into(),
        }
    }
}

impl fmt::Display for PeerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.addr)
    }
}

/// Concurrency-safe map of known peers.
///
/// An address is present iff the node currently believes that peer is
/// reachable under the recorded name. Handles are cheap clones sharing one
/// map; every operation takes the lock for its full duration, so concurrent
/// upserts and removes from different connection handlers serialize cleanly
/// (last writer wins per address).
#[derive(Debug, Clone, Default)]
pub struct MembershipTable {
    peers: Arc<RwLock<HashMap<PeerAddr, PeerRecord>>>,
}

impl MembershipTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for `addr`.
    pub async fn upsert(&self, addr: PeerAddr, name: impl Into<String>) {
        let record = PeerRecord::new(addr, name);
        self.peers.write().await.insert(addr, record);
    }

    /// Remove the record for `addr`, returning it if present.
    pub async fn remove(&self, addr: &PeerAddr) -> Option<PeerRecord> {
        self.peers.write().await.remove(addr)
    }

    /// Whether `addr` is currently known.
    pub async fn contains(&self, addr: &PeerAddr) -> bool {
        self.peers.read().await.contains_key(addr)
    }

    /// Look up a single record.
    pub async fn get(&self, addr: &PeerAddr) -> Option<PeerRecord> {
        self.peers.read().await.get(addr).cloned()
    }

    /// A consistent point-in-time copy, safe to iterate without holding the
    /// lock.
    pub async fn snapshot(&self) -> Vec<PeerRecord> {
        self.peers.read().await.values().cloned().collect()
    }

    /// Number of known peers.
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Whether the table is empty.
    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}
