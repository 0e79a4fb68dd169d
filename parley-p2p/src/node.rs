//! Node composition: listener, membership, and the public operations.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::NodeConfig;
use crate::dispatch::dispatch;
use crate::error::{MeshResult, TransportError};
use crate::event::NodeEvent;
use crate::liveness::verify_all;
use crate::membership::{MembershipTable, PeerAddr, PeerRecord};
use crate::transport::{self, Listener};
use crate::wire::{Frame, FrameKind, BODY_CONNECT};

/// Capacity of the events channel handed to the observer.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Everything a connection handler needs, cheap to clone into tasks.
#[derive(Clone)]
struct NodeContext {
    config: Arc<NodeConfig>,
    table: MembershipTable,
    events_tx: mpsc::Sender<NodeEvent>,
    /// The address this node announces in every outbound frame.
    self_addr: PeerAddr,
}

impl NodeContext {
    /// Deliver an event to the observer, if one is still listening.
    fn emit(&self, event: NodeEvent) {
        if let Err(e) = self.events_tx.try_send(event) {
            tracing::debug!(error = %e, "event dropped, observer not keeping up");
        }
    }

    /// Encode and send one frame to `target`, treating failure as liveness
    /// evidence: the target is dropped from the table and reported
    /// unreachable.
    async fn send_frame(&self, target: PeerAddr, body: &str) -> Result<(), TransportError> {
        let frame = Frame::new(self.self_addr, self.config.display_name.clone(), body);

        match transport::send_once(target, &frame.encode(), self.config.connect_timeout).await {
            Ok(()) => {
                tracing::debug!(addr = %target, body = %body, "frame sent");

                // Announcing our own departure also forgets the target.
                if frame.kind() == FrameKind::Exit {
                    if let Some(peer) = self.table.remove(&target).await {
                        tracing::info!(peer = %peer, "disconnected from peer");
                        self.emit(NodeEvent::PeerDisconnected { peer });
                    }
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(addr = %target, error = %e, "send failed, removing from active peers");
                self.table.remove(&target).await;
                self.emit(NodeEvent::PeerUnreachable { addr: target });
                Err(e)
            }
        }
    }
}

/// A running mesh node.
///
/// Owns the membership table and the background listener; the interactive
/// layer drives it through [`send_user_message`](MeshNode::send_user_message),
/// [`active_peers`](MeshNode::active_peers) and
/// [`broadcast_connect`](MeshNode::broadcast_connect). The listener runs for
/// the life of the process; there is no shutdown surface.
pub struct MeshNode {
    ctx: NodeContext,
    local_addr: SocketAddr,
}

impl MeshNode {
    /// Bind the listener, start accepting in the background, and fire a
    /// connect handshake at every bootstrap peer.
    ///
    /// Returns the node and the channel of user-visible events. The bound
    /// address is available from [`local_addr`](MeshNode::local_addr) (the
    /// configured port 0 resolves to a real one here). Bootstrap failures
    /// are swallowed: those peers may simply be offline.
    pub async fn start(config: NodeConfig) -> MeshResult<(MeshNode, mpsc::Receiver<NodeEvent>)> {
        let listener = Listener::bind(config.bind_addr).await?;
        let local_addr = listener.local_addr()?;

        let advertise_ip = config.advertise_ip.unwrap_or_else(|| {
            local_ip_address::local_ip().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
        });
        let self_addr = PeerAddr::new(advertise_ip, local_addr.port());

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let ctx = NodeContext {
            config: Arc::new(config),
            table: MembershipTable::new(),
            events_tx,
            self_addr,
        };

        tracing::info!(
            name = %ctx.config.display_name,
            addr = %self_addr,
            "mesh node started"
        );

        tokio::spawn(accept_loop(listener, ctx.clone()));

        // Fire-and-forget handshakes at the static peer list.
        for target in ctx.config.bootstrap_peers.clone() {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                let frame = Frame::new(ctx.self_addr, ctx.config.display_name.clone(), BODY_CONNECT);
                if let Err(e) =
                    transport::send_once(target, &frame.encode(), ctx.config.connect_timeout).await
                {
                    tracing::debug!(addr = %target, error = %e, "bootstrap peer unreachable");
                }
            });
        }

        Ok((MeshNode { ctx, local_addr }, events_rx))
    }

    /// The actual bound listener address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The address announced in outbound frames.
    pub fn self_addr(&self) -> PeerAddr {
        self.ctx.self_addr
    }

    /// The configured display name.
    pub fn display_name(&self) -> &str {
        &self.ctx.config.display_name
    }

    /// Handle on the membership table.
    pub fn table(&self) -> &MembershipTable {
        &self.ctx.table
    }

    /// Send an ad-hoc message to a peer.
    ///
    /// A transport failure is itself evidence of unreachability: the target
    /// is removed from the table (present or not, it stays absent) and the
    /// error is returned for reporting. Sending an `exit` body announces
    /// departure and forgets the target locally on success.
    pub async fn send_user_message(
        &self,
        target: PeerAddr,
        body: &str,
    ) -> Result<(), TransportError> {
        self.ctx.send_frame(target, body).await
    }

    /// Verify liveness, then return the surviving peers.
    pub async fn active_peers(&self) -> Vec<PeerRecord> {
        for peer in verify_all(&self.ctx.table, self.ctx.config.probe_timeout).await {
            self.ctx.emit(NodeEvent::PeerExpired { peer });
        }
        self.ctx.table.snapshot().await
    }

    /// Verify liveness, then send a connect handshake to every remaining
    /// peer. Returns the number of successful sends; zero means no peers
    /// were available (before or after verification).
    pub async fn broadcast_connect(&self) -> usize {
        for peer in verify_all(&self.ctx.table, self.ctx.config.probe_timeout).await {
            self.ctx.emit(NodeEvent::PeerExpired { peer });
        }

        let snapshot = self.ctx.table.snapshot().await;
        if snapshot.is_empty() {
            return 0;
        }

        let mut sends = JoinSet::new();
        for record in snapshot {
            let ctx = self.ctx.clone();
            sends.spawn(async move { ctx.send_frame(record.addr, BODY_CONNECT).await.is_ok() });
        }

        let mut sent = 0;
        while let Some(result) = sends.join_next().await {
            if matches!(result, Ok(true)) {
                sent += 1;
            }
        }
        sent
    }
}

/// Accept connections forever, one handler task per connection.
///
/// Handler failures are isolated: a bad frame or dead socket never reaches
/// this loop or a sibling handler.
async fn accept_loop(listener: Listener, ctx: NodeContext) {
    loop {
        match listener.accept().await {
            Ok((stream, remote)) => {
                let ctx = ctx.clone();
                tokio::spawn(handle_connection(stream, remote, ctx));
            }
            Err(e) => {
                tracing::warn!(error = %e, "accept error");
            }
        }
    }
}

// TODO: cap concurrent handler tasks with a semaphore once floods show up in
// practice; reads are already bounded per connection.

/// Handle one accepted connection: read the frame, dispatch it, send any
/// protocol reply fire-and-forget.
async fn handle_connection(stream: TcpStream, remote: SocketAddr, ctx: NodeContext) {
    let payload = match transport::read_frame(stream).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(remote = %remote, error = %e, "failed to read frame");
            return;
        }
    };

    // Bare connects carry no payload; our own probes look like this.
    if payload.is_empty() {
        tracing::trace!(remote = %remote, "empty payload, ignored");
        return;
    }

    let frame = match Frame::decode(&payload) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(remote = %remote, error = %e, "dropping malformed frame");
            return;
        }
    };

    let reply_to = frame.sender;
    let outcome = dispatch(frame, &ctx.table).await;

    for event in outcome.events {
        ctx.emit(event);
    }

    if let Some(reply) = outcome.reply {
        // One-shot outbound on its own task; the handler does not wait on
        // the acknowledgement being deliverable.
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if let Err(e) = ctx.send_frame(reply_to, reply.body()).await {
                tracing::debug!(addr = %reply_to, error = %e, "reply not delivered");
            }
        });
    }
}
