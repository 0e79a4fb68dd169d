//! The inbound message state machine.
//!
//! `dispatch` interprets one decoded frame: it updates the membership table
//! and returns what happened plus any reply the transport should send. The
//! caller owns the socket work, so the transitions here are testable with a
//! table and nothing else.

use crate::event::NodeEvent;
use crate::membership::{MembershipTable, PeerRecord};
use crate::wire::{Frame, FrameKind, BODY_CONNECT_ACK};

/// A protocol reply the caller should send back to the frame's sender,
/// fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Acknowledge a connect request.
    ConnectAck,
}

impl Reply {
    /// The wire body for this reply.
    pub fn body(&self) -> &'static str {
        match self {
            Reply::ConnectAck => BODY_CONNECT_ACK,
        }
    }
}

/// Result of dispatching one frame.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// User-visible events, in occurrence order.
    pub events: Vec<NodeEvent>,
    /// Reply to send to the frame's sender, if any.
    pub reply: Option<Reply>,
}

/// Apply one inbound frame to the membership table.
///
/// Every frame except an exit notice marks its sender as known and active,
/// whatever the body says. A connect request additionally asks for a
/// `connect_ack` reply; the acknowledgement itself is terminal and answers
/// nothing (whether it should is an open point of the protocol, observed
/// behavior says no).
pub async fn dispatch(frame: Frame, table: &MembershipTable) -> DispatchOutcome {
    let mut outcome = DispatchOutcome::default();
    let kind = frame.kind();

    match kind {
        FrameKind::Exit => {
            if let Some(peer) = table.remove(&frame.sender).await {
                tracing::info!(peer = %peer, "peer disconnected");
                outcome.events.push(NodeEvent::PeerDisconnected { peer });
            } else {
                tracing::debug!(addr = %frame.sender, "exit from unknown peer, ignored");
            }
        }
        FrameKind::Connect | FrameKind::ConnectAck | FrameKind::Chat => {
            table.upsert(frame.sender, frame.sender_name.clone()).await;
            let peer = PeerRecord::new(frame.sender, frame.sender_name.clone());

            tracing::info!(peer = %peer, kind = kind.name(), body = %frame.body, "message received");
            outcome.events.push(NodeEvent::MessageReceived {
                from: peer.clone(),
                body: frame.body.clone(),
            });

            match kind {
                FrameKind::Connect => {
                    outcome.reply = Some(Reply::ConnectAck);
                }
                FrameKind::ConnectAck => {
                    tracing::info!(peer = %peer, "peer confirmed active");
                    outcome.events.push(NodeEvent::PeerConfirmed { peer });
                }
                _ => {}
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::PeerAddr;

    fn frame(body: &str) -> Frame {
        Frame::new("10.0.0.7:5007".parse().unwrap(), "carol", body)
    }

    fn sender() -> PeerAddr {
        "10.0.0.7:5007".parse().unwrap()
    }

    #[tokio::test]
    async fn test_chat_upserts_and_reports() {
        let table = MembershipTable::new();
        let outcome = dispatch(frame("hello there"), &table).await;

        assert!(table.contains(&sender()).await);
        assert_eq!(table.get(&sender()).await.unwrap().name, "carol");
        assert!(outcome.reply.is_none());
        assert_eq!(outcome.events.len(), 1);
        assert!(matches!(
            &outcome.events[0],
            NodeEvent::MessageReceived { body, .. } if body == "hello there"
        ));
    }

    #[tokio::test]
    async fn test_connect_upserts_and_requests_ack() {
        let table = MembershipTable::new();
        let outcome = dispatch(frame("connect"), &table).await;

        assert!(table.contains(&sender()).await);
        assert_eq!(outcome.reply, Some(Reply::ConnectAck));
        assert_eq!(outcome.reply.unwrap().body(), "connect_ack");
    }

    #[tokio::test]
    async fn test_connect_ack_confirms_without_reply() {
        let table = MembershipTable::new();
        let outcome = dispatch(frame("connect_ack"), &table).await;

        assert!(table.contains(&sender()).await);
        assert!(outcome.reply.is_none());
        assert!(outcome
            .events
            .iter()
            .any(|e| matches!(e, NodeEvent::PeerConfirmed { .. })));
    }

    #[tokio::test]
    async fn test_unsolicited_connect_ack_accepted() {
        // An ack can arrive from an address we never connect-requested; it
        // still marks the sender active.
        let table = MembershipTable::new();
        assert!(!table.contains(&sender()).await);

        let outcome = dispatch(frame("connect_ack"), &table).await;
        assert!(table.contains(&sender()).await);
        assert!(outcome.reply.is_none());
    }

    #[tokio::test]
    async fn test_exit_removes_known_peer() {
        let table = MembershipTable::new();
        table.upsert(sender(), "carol").await;

        let outcome = dispatch(frame("exit"), &table).await;

        assert!(!table.contains(&sender()).await);
        assert_eq!(outcome.events.len(), 1);
        assert!(matches!(
            &outcome.events[0],
            NodeEvent::PeerDisconnected { peer } if peer.name == "carol"
        ));
    }

    #[tokio::test]
    async fn test_exit_from_unknown_is_noop() {
        let table = MembershipTable::new();
        let outcome = dispatch(frame("exit"), &table).await;

        assert!(table.is_empty().await);
        assert!(outcome.events.is_empty());
        assert!(outcome.reply.is_none());
    }

    #[tokio::test]
    async fn test_exit_case_insensitive() {
        let table = MembershipTable::new();
        table.upsert(sender(), "carol").await;

        dispatch(frame("  EXIT "), &table).await;
        assert!(!table.contains(&sender()).await);
    }

    #[tokio::test]
    async fn test_upsert_refreshes_name() {
        let table = MembershipTable::new();
        table.upsert(sender(), "old-name").await;

        dispatch(frame("hi again"), &table).await;
        assert_eq!(table.get(&sender()).await.unwrap().name, "carol");
    }
}
