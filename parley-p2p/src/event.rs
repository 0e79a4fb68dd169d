//! Events reported to external observers (the CLI layer).

use std::fmt;

use crate::membership::{PeerAddr, PeerRecord};

/// Something user-visible happened.
///
/// The library logs each occurrence through `tracing` where it happens and
/// additionally delivers one of these on the node's event channel; rendering
/// is the consumer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    /// An inbound message arrived (any body except `exit`).
    MessageReceived {
        /// Sender as recorded in the table.
        from: PeerRecord,
        /// Message body, verbatim.
        body: String,
    },
    /// A peer acknowledged our connect request and is confirmed active.
    PeerConfirmed {
        /// The confirmed peer.
        peer: PeerRecord,
    },
    /// A peer announced its departure with an exit notice.
    PeerDisconnected {
        /// The departed peer.
        peer: PeerRecord,
    },
    /// A peer failed its liveness probe and was dropped from the table.
    PeerExpired {
        /// The dropped peer.
        peer: PeerRecord,
    },
    /// An outbound send failed; the target was dropped from the table if it
    /// was present.
    PeerUnreachable {
        /// The unreachable address.
        addr: PeerAddr,
    },
}

impl fmt::Display for NodeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeEvent::MessageReceived { from, body } => {
                write!(f, "[{} ({})]: {}", from.name, from.addr, body)
            }
            NodeEvent::PeerConfirmed { peer } => {
                write!(f, "{} is now an active peer", peer)
            }
            NodeEvent::PeerDisconnected { peer } => {
                write!(f, "{} disconnected", peer)
            }
            NodeEvent::PeerExpired { peer } => {
                write!(f, "{} removed due to inactivity", peer.addr)
            }
            NodeEvent::PeerUnreachable { addr } => {
                write!(f, "unable to reach {}, removed from active peers", addr)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        let peer = PeerRecord::new("10.0.0.1:5001".parse().unwrap(), "bob");

        let ev = NodeEvent::MessageReceived {
            from: peer.clone(),
            body: "hi".to_string(),
        };
        assert_eq!(ev.to_string(), "[bob (10.0.0.1:5001)]: hi");

        let ev = NodeEvent::PeerConfirmed { peer: peer.clone() };
        assert_eq!(ev.to_string(), "bob (10.0.0.1:5001) is now an active peer");

        let ev = NodeEvent::PeerDisconnected { peer };
        assert_eq!(ev.to_string(), "bob (10.0.0.1:5001) disconnected");
    }
}
