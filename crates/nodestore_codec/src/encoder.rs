//! Snapshot encoding.

use crate::error::CodecResult;
use crate::snapshot::Snapshot;

/// Encodes a snapshot as pretty-printed JSON text.
///
/// Node records appear in ascending key order and field order is fixed,
/// so identical stores always produce identical documents.
pub fn encode_snapshot(snapshot: &Snapshot) -> CodecResult<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{SnapshotNode, SnapshotReference};
    use crate::value::Value;
    use std::collections::BTreeMap;

    fn sample_node(key: u64) -> SnapshotNode {
        let mut properties = BTreeMap::new();
        properties.insert("name".to_string(), Value::Text(format!("node-{key}")));
        let mut related = BTreeMap::new();
        related.insert(
            "owner".to_string(),
            vec![SnapshotReference {
                store_name: "sample.Owner".to_string(),
                key: 1,
            }],
        );
        SnapshotNode {
            key,
            store_name: "sample.Item".to_string(),
            properties,
            related,
            children: BTreeMap::new(),
        }
    }

    #[test]
    fn encodes_keys_as_decimal_object_keys() {
        let mut snapshot = Snapshot::new();
        snapshot.nodes.insert(2, sample_node(2));
        snapshot.nodes.insert(10, sample_node(10));

        let text = encode_snapshot(&snapshot).unwrap();
        assert!(text.contains("\"2\""));
        assert!(text.contains("\"10\""));
        assert!(text.contains("\"storeName\": \"sample.Item\""));
    }

    #[test]
    fn encoding_is_deterministic() {
        let mut snapshot = Snapshot::new();
        snapshot.nodes.insert(5, sample_node(5));
        snapshot.nodes.insert(3, sample_node(3));

        let first = encode_snapshot(&snapshot).unwrap();
        let second = encode_snapshot(&snapshot).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn references_carry_store_name_and_key() {
        let mut snapshot = Snapshot::new();
        snapshot.nodes.insert(2, sample_node(2));

        let text = encode_snapshot(&snapshot).unwrap();
        assert!(text.contains("\"storeName\": \"sample.Owner\""));
        assert!(text.contains("\"key\": 1"));
    }
}
