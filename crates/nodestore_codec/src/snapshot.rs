//! Snapshot document model.
//!
//! A snapshot is the durable form of one store: a map of node key to node
//! record. Transient store state (dirty flag, entity type) is never part
//! of the document; the key counter is re-derived from the maximum key.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A reference to a node in some store, as written to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotReference {
    /// Name of the store holding the target node.
    pub store_name: String,
    /// Key of the target node within that store.
    pub key: u64,
}

/// One node record as written to a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    /// The node's key.
    pub key: u64,
    /// Name of the store the node belongs to.
    pub store_name: String,
    /// Flat property map.
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    /// Relationship name to outgoing references.
    #[serde(default)]
    pub related: BTreeMap<String, Vec<SnapshotReference>>,
    /// Hierarchical containment references (parallel to `related`).
    #[serde(default)]
    pub children: BTreeMap<String, Vec<SnapshotReference>>,
}

/// The full snapshot document for one store.
///
/// Serializes as a single JSON object mapping decimal keys to node records,
/// in ascending key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    /// Node records by key.
    pub nodes: BTreeMap<u64, SnapshotNode>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the largest key present, or zero for an empty snapshot.
    ///
    /// Used to resume the store's key counter after a reload.
    pub fn max_key(&self) -> u64 {
        self.nodes.keys().next_back().copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_key_of_empty_snapshot() {
        assert_eq!(Snapshot::new().max_key(), 0);
    }

    #[test]
    fn max_key_tracks_largest() {
        let mut snapshot = Snapshot::new();
        for key in [3u64, 11, 7] {
            snapshot.nodes.insert(
                key,
                SnapshotNode {
                    key,
                    store_name: "sample".to_string(),
                    properties: BTreeMap::new(),
                    related: BTreeMap::new(),
                    children: BTreeMap::new(),
                },
            );
        }
        assert_eq!(snapshot.max_key(), 11);
    }
}
