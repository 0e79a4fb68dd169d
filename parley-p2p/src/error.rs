//! Error types for the parley mesh.

use std::io;

use thiserror::Error;

use crate::membership::PeerAddr;

/// Errors raised while decoding an inbound frame.
///
/// All variants mean the same thing to the caller: the frame is malformed
/// and must be dropped without touching membership state.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Frame had fewer than the four required fields.
    #[error("malformed frame: expected 4 fields, got {0}")]
    Truncated(usize),

    /// The port field was not a valid integer.
    #[error("malformed frame: invalid port {0:?}")]
    InvalidPort(String),

    /// The sender IP field was not a valid address.
    #[error("malformed frame: invalid ip {0:?}")]
    InvalidIp(String),

    /// Payload was not valid UTF-8.
    #[error("malformed frame: payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Errors raised by outbound transport operations.
///
/// Both variants are liveness evidence: callers that hold a membership entry
/// for the target are expected to drop it.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connect or write to the peer failed.
    #[error("peer {addr} unreachable: {source}")]
    Unreachable {
        addr: PeerAddr,
        #[source]
        source: io::Error,
    },

    /// Connect attempt exceeded its deadline.
    #[error("connection to {addr} timed out")]
    Timeout { addr: PeerAddr },
}

impl TransportError {
    /// The peer this operation was addressed to.
    pub fn addr(&self) -> PeerAddr {
        match self {
            TransportError::Unreachable { addr, .. } => *addr,
            TransportError::Timeout { addr } => *addr,
        }
    }
}

/// Mesh-level errors.
#[derive(Debug, Error)]
pub enum MeshError {
    /// I/O error during local operations (binding the listener, reading a
    /// bootstrap file).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Inbound frame could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Outbound transport operation failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Bootstrap peers file was present but unusable.
    #[error("bootstrap file error: {0}")]
    Bootstrap(String),
}

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
