//! Per-node snapshot store read by the xDS delivery layer

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock};

use kube::ResourceExt;
use tracing::{debug, info};

use crate::crd::Gateway;

use super::snapshot::Snapshot;

/// Key proxies fall back to when their node metadata names no Gateway
pub const FALLBACK_NODE_CACHE_KEY: &str = "misconfigured-node";

/// Node key of the proxy serving `namespace/name`
pub fn snapshot_cache_key(namespace: &str, name: &str) -> String {
    format!("{namespace}~{name}")
}

pub fn gateway_cache_key(gw: &Gateway) -> String {
    snapshot_cache_key(
        gw.namespace().as_deref().unwrap_or("default"),
        &gw.name_any(),
    )
}

#[derive(Debug, Default)]
pub struct SnapshotCache {
    snapshots: RwLock<BTreeMap<String, Arc<Snapshot>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot` under `key`.
    ///
    /// Returns `false` and keeps the current entry when it already carries the
    /// same versions, so unchanged config is never re-published.
    pub fn set_snapshot(&self, key: &str, snapshot: Snapshot) -> bool {
        let mut snapshots = self.snapshots.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = snapshots.get(key) {
            if current.same_versions(&snapshot) {
                debug!(key, "snapshot unchanged");
                return false;
            }
        }
        snapshots.insert(key.to_string(), Arc::new(snapshot));
        true
    }

    pub fn get_snapshot(&self, key: &str) -> Option<Arc<Snapshot>> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Every node key that currently holds a snapshot
    pub fn status_keys(&self) -> Vec<String> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Replace the snapshot of every key not in `live_keys` with the empty
    /// snapshot. The fallback key is always kept. Returns the keys that changed.
    pub fn clear_stale(&self, live_keys: &BTreeSet<String>) -> Vec<String> {
        let stale: Vec<String> = self
            .status_keys()
            .into_iter()
            .filter(|key| key != FALLBACK_NODE_CACHE_KEY && !live_keys.contains(key))
            .collect();

        stale
            .into_iter()
            .filter(|key| {
                let changed = self.set_snapshot(key, Snapshot::empty());
                if changed {
                    info!(key = key.as_str(), "clearing snapshot of removed gateway");
                }
                changed
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xds::{Cluster, Resources, Version};

    fn snapshot_with_clusters(version: &str) -> Snapshot {
        Snapshot {
            clusters: Resources::new(
                Version::Hashed(version.to_string()),
                vec![Cluster::new("backend")],
            ),
            ..Snapshot::empty()
        }
    }

    #[test]
    fn test_snapshot_cache_key() {
        assert_eq!(snapshot_cache_key("default", "gw"), "default~gw");
    }

    #[test]
    fn test_set_snapshot_detects_changes() {
        let cache = SnapshotCache::new();
        assert!(cache.set_snapshot("default~gw", snapshot_with_clusters("1")));
        assert!(!cache.set_snapshot("default~gw", snapshot_with_clusters("1")));
        assert!(cache.set_snapshot("default~gw", snapshot_with_clusters("2")));

        let stored = cache.get_snapshot("default~gw").unwrap();
        assert_eq!(stored.clusters.version(), &Version::Hashed("2".to_string()));
    }

    #[test]
    fn test_clear_stale_keeps_live_and_fallback_keys() {
        let cache = SnapshotCache::new();
        cache.set_snapshot("default~live", snapshot_with_clusters("1"));
        cache.set_snapshot("default~gone", snapshot_with_clusters("1"));
        cache.set_snapshot(FALLBACK_NODE_CACHE_KEY, snapshot_with_clusters("1"));

        let live = BTreeSet::from(["default~live".to_string()]);
        assert_eq!(cache.clear_stale(&live), vec!["default~gone".to_string()]);

        assert_eq!(*cache.get_snapshot("default~gone").unwrap(), Snapshot::empty());
        assert_eq!(cache.get_snapshot("default~live").unwrap().clusters.len(), 1);
        assert_eq!(
            cache.get_snapshot(FALLBACK_NODE_CACHE_KEY).unwrap().clusters.len(),
            1
        );

        // already empty; nothing changes on the next pass
        assert!(cache.clear_stale(&live).is_empty());
    }
}
