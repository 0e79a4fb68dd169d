//! Peer-to-peer presence and messaging for the parley mesh.
//!
//! This crate provides the core of a minimal presence node:
//!
//! - A single-line plaintext wire codec (one frame per connection)
//! - Short-lived connection transport (connect, deliver, close)
//! - A concurrency-safe membership table of known peers
//! - Pull-based liveness verification with bounded-timeout probes
//! - The connect / connect_ack / exit dispatch state machine
//!
//! # Architecture
//!
//! Each accepted connection is handled on its own tokio task; the only
//! shared mutable state is the membership table behind its own lock.
//!
//! ```text
//! MeshNode::start()
//! ├── Accept Loop Task (listener)
//! │   ├── Handler Task (one per accepted connection)
//! │   └── Handler Task ...
//! └── Bootstrap Tasks (one connect per static peer)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use parley_p2p::{MeshNode, NodeConfig};
//!
//! let config = NodeConfig::new("alice", 5001);
//! let (node, mut events) = MeshNode::start(config).await?;
//!
//! node.send_user_message("10.0.0.2:5002".parse()?, "hello").await?;
//! for peer in node.active_peers().await {
//!     println!("{}", peer);
//! }
//! ```

pub mod bootstrap;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod liveness;
pub mod membership;
pub mod node;
pub mod transport;
pub mod wire;

// Re-export main types
pub use config::{NodeConfig, DEFAULT_PORT, MAX_FRAME_SIZE, STATIC_PEERS};
pub use error::{DecodeError, MeshError, MeshResult, TransportError};
pub use event::NodeEvent;
pub use membership::{MembershipTable, PeerAddr, PeerRecord};
pub use node::MeshNode;
pub use wire::{Frame, FrameKind};
