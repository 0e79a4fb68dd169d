//! Bootstrap peers file.
//!
//! An optional JSON file supplies the fixed peer list contacted once at
//! startup. Load-only: membership itself is point-in-time and is never
//! written back to disk.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{MeshError, MeshResult};
use crate::membership::PeerAddr;

/// On-disk bootstrap list format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapFile {
    /// Version of the file format.
    pub version: u32,
    /// `ip:port` entries.
    pub peers: Vec<String>,
}

impl Default for BootstrapFile {
    fn default() -> Self {
        Self {
            version: 1,
            peers: Vec::new(),
        }
    }
}

/// Load bootstrap peers from a file.
///
/// A missing file is an empty list, not an error. Entries that fail to parse
/// are skipped with a warning so one bad line doesn't take out the rest.
pub async fn load_peers(path: &Path) -> MeshResult<Vec<PeerAddr>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(path).await?;
    let file: BootstrapFile = serde_json::from_str(&contents)
        .map_err(|e| MeshError::Bootstrap(format!("failed to parse {}: {}", path.display(), e)))?;

    let peers: Vec<PeerAddr> = file
        .peers
        .iter()
        .filter_map(|entry| match entry.parse::<PeerAddr>() {
            Ok(addr) => Some(addr),
            Err(_) => {
                tracing::warn!(entry = %entry, path = %path.display(), "skipping unparseable bootstrap entry");
                None
            }
        })
        .collect();

    tracing::info!(count = peers.len(), path = %path.display(), "loaded bootstrap peers");

    Ok(peers)
}
