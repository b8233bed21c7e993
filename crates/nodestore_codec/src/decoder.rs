//! Snapshot decoding.

use crate::error::{CodecError, CodecResult};
use crate::snapshot::{Snapshot, SnapshotNode};

/// Decodes a snapshot from JSON text.
///
/// The document must be a single JSON object whose keys are decimal node
/// keys. Strings matching the fixed ISO date/time forms are recovered as
/// typed temporal values; all other scalars keep their JSON type.
pub fn decode_snapshot(text: &str) -> CodecResult<Snapshot> {
    let raw: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Object(entries) = raw else {
        return Err(CodecError::invalid_structure(
            "snapshot document must be a JSON object",
        ));
    };
    let mut snapshot = Snapshot::new();
    for (key_text, record) in entries {
        let key: u64 = key_text
            .parse()
            .map_err(|_| CodecError::invalid_key(&key_text))?;
        let node: SnapshotNode = serde_json::from_value(record)?;
        snapshot.nodes.insert(key, node);
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_snapshot;
    use crate::snapshot::SnapshotReference;
    use crate::value::Value;
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::BTreeMap;

    #[test]
    fn roundtrip_preserves_nodes() {
        let mut properties = BTreeMap::new();
        properties.insert("title".to_string(), Value::Text("First".to_string()));
        properties.insert(
            "due".to_string(),
            Value::Date(NaiveDate::from_ymd_opt(2016, 3, 1).unwrap()),
        );
        properties.insert(
            "alarm".to_string(),
            Value::Time(NaiveTime::from_hms_opt(8, 30, 0).unwrap()),
        );
        let mut related = BTreeMap::new();
        related.insert(
            "assignee".to_string(),
            vec![SnapshotReference {
                store_name: "sample.User".to_string(),
                key: 4,
            }],
        );

        let mut snapshot = Snapshot::new();
        snapshot.nodes.insert(
            1,
            SnapshotNode {
                key: 1,
                store_name: "sample.Task".to_string(),
                properties,
                related,
                children: BTreeMap::new(),
            },
        );

        let text = encode_snapshot(&snapshot).unwrap();
        let decoded = decode_snapshot(&text).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn missing_maps_default_to_empty() {
        let text = r#"{"9": {"key": 9, "storeName": "sample.Task"}}"#;
        let decoded = decode_snapshot(text).unwrap();
        let node = &decoded.nodes[&9];
        assert!(node.properties.is_empty());
        assert!(node.related.is_empty());
        assert!(node.children.is_empty());
    }

    #[test]
    fn malformed_text_is_an_error() {
        let result = decode_snapshot("{ not json");
        assert!(matches!(result, Err(CodecError::Json(_))));
    }

    #[test]
    fn non_object_document_is_a_structure_error() {
        let result = decode_snapshot(r#"[1, 2, 3]"#);
        assert!(matches!(result, Err(CodecError::InvalidStructure { .. })));
    }

    #[test]
    fn non_numeric_key_is_a_key_error() {
        let text = r#"{"first": {"key": 1, "storeName": "sample.Task"}}"#;
        let result = decode_snapshot(text);
        match result {
            Err(CodecError::InvalidKey { text }) => assert_eq!(text, "first"),
            other => panic!("expected invalid key error, got {other:?}"),
        }
    }

    #[test]
    fn empty_object_is_an_empty_snapshot() {
        let decoded = decode_snapshot("{}").unwrap();
        assert!(decoded.nodes.is_empty());
        assert_eq!(decoded.max_key(), 0);
    }
}
