//! Connection transport: one short-lived connection per message.
//!
//! Outbound operations open a fresh connection, deliver (or probe) and close.
//! The inbound side is a plain listener; the node's accept loop spawns one
//! handler task per accepted connection so acceptance never blocks on
//! handling.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use crate::config::MAX_FRAME_SIZE;
use crate::error::{MeshResult, TransportError};
use crate::membership::PeerAddr;

/// Send one payload to a peer over a fresh connection.
///
/// Connects within `connect_timeout`, writes the whole payload, shuts the
/// stream down and closes it. No retry: the caller decides what a failure
/// means for membership.
pub async fn send_once(
    addr: PeerAddr,
    payload: &[u8],
    connect_timeout: Duration,
) -> Result<(), TransportError> {
    let mut stream = match timeout(connect_timeout, TcpStream::connect(addr.socket_addr())).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => return Err(TransportError::Unreachable { addr, source }),
        Err(_) => return Err(TransportError::Timeout { addr }),
    };

    stream
        .write_all(payload)
        .await
        .map_err(|source| TransportError::Unreachable { addr, source })?;

    // Half-close so the remote's read completes promptly.
    stream
        .shutdown()
        .await
        .map_err(|source| TransportError::Unreachable { addr, source })?;

    Ok(())
}

/// Test whether a peer is reachable.
///
/// Opens a connection within `timeout`, writes nothing, closes immediately.
pub async fn probe(addr: PeerAddr, probe_timeout: Duration) -> bool {
    matches!(
        timeout(probe_timeout, TcpStream::connect(addr.socket_addr())).await,
        Ok(Ok(_))
    )
}

/// The inbound listener.
#[derive(Debug)]
pub struct Listener {
    listener: TcpListener,
}

impl Listener {
    /// Bind on the given address.
    pub async fn bind(addr: SocketAddr) -> MeshResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening for inbound connections");
        Ok(Self { listener })
    }

    /// The actual bound address (resolves port 0).
    pub fn local_addr(&self) -> MeshResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept the next connection.
    pub async fn accept(&self) -> std::io::Result<(TcpStream, SocketAddr)> {
        self.listener.accept().await
    }
}

/// Read one frame payload from an accepted connection, consuming it.
///
/// Reads until the remote closes, bounded at [`MAX_FRAME_SIZE`] bytes; the
/// frame is whatever arrived by then. An empty result means the remote
/// connected without sending anything (a liveness probe does exactly this).
pub async fn read_frame(stream: TcpStream) -> std::io::Result<Vec<u8>> {
    let mut payload = Vec::with_capacity(256);
    let mut bounded = stream.take(MAX_FRAME_SIZE as u64);
    bounded.read_to_end(&mut payload).await?;
    Ok(payload)
}
