//! Liveness verification: probe known peers, drop the unreachable.

use std::time::Duration;

use tokio::task::JoinSet;

use crate::membership::{MembershipTable, PeerRecord};
use crate::transport;

/// Probe every known peer and remove the ones that fail.
///
/// Works on a snapshot: probes run concurrently (one task per peer, each
/// against its own connection) and only the removals touch the shared table.
/// Returns the removed records for reporting. Verification is pull-only;
/// callers invoke it right before operations that must reflect current
/// reachability.
pub async fn verify_all(table: &MembershipTable, probe_timeout: Duration) -> Vec<PeerRecord> {
    let snapshot = table.snapshot().await;
    if snapshot.is_empty() {
        return Vec::new();
    }

    let mut probes = JoinSet::new();
    for record in snapshot {
        probes.spawn(async move {
            let reachable = transport::probe(record.addr, probe_timeout).await;
            (record, reachable)
        });
    }

    let mut expired = Vec::new();
    while let Some(result) = probes.join_next().await {
        // A panicked probe task counts as a failed probe.
        match result {
            Ok((_, true)) => {}
            Ok((record, false)) => expired.push(record),
            Err(e) => tracing::warn!(error = %e, "liveness probe task failed"),
        }
    }

    for record in &expired {
        table.remove(&record.addr).await;
        tracing::info!(addr = %record.addr, name = %record.name, "peer removed due to inactivity");
    }

    expired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::PeerAddr;
    use crate::transport::Listener;

    async fn dead_addr() -> PeerAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = PeerAddr::from(listener.local_addr().unwrap());
        drop(listener);
        addr
    }

    #[tokio::test]
    async fn test_verify_all_empty_table() {
        let table = MembershipTable::new();
        let expired = verify_all(&table, Duration::from_millis(200)).await;
        assert!(expired.is_empty());
    }

    #[tokio::test]
    async fn test_verify_all_keeps_reachable() {
        let listener = Listener::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let live = PeerAddr::from(listener.local_addr().unwrap());

        let table = MembershipTable::new();
        table.upsert(live, "alive").await;

        let expired = verify_all(&table, Duration::from_secs(1)).await;
        assert!(expired.is_empty());
        assert!(table.contains(&live).await);
    }

    #[tokio::test]
    async fn test_verify_all_removes_unreachable() {
        let listener = Listener::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let live = PeerAddr::from(listener.local_addr().unwrap());
        let dead = dead_addr().await;

        let table = MembershipTable::new();
        table.upsert(live, "alive").await;
        table.upsert(dead, "gone").await;

        let expired = verify_all(&table, Duration::from_secs(1)).await;

        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].addr, dead);
        assert_eq!(expired[0].name, "gone");
        assert!(table.contains(&live).await);
        assert!(!table.contains(&dead).await);
    }
}
