//! Node records and cross-store references.

use crate::types::NodeKey;
use nodestore_codec::{SnapshotNode, SnapshotReference, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A durable pointer from one node to another.
///
/// References name the target by `(store name, key)` rather than by any
/// in-memory address, so they survive serialization and store reloads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeReference {
    store_name: String,
    key: NodeKey,
}

impl NodeReference {
    /// Creates a reference to the node with `key` in the named store.
    pub fn new(store_name: impl Into<String>, key: NodeKey) -> Self {
        Self {
            store_name: store_name.into(),
            key,
        }
    }

    /// Name of the store holding the target node.
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// Key of the target node within its store.
    pub fn key(&self) -> NodeKey {
        self.key
    }
}

impl fmt::Display for NodeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.store_name, self.key)
    }
}

impl From<&NodeReference> for SnapshotReference {
    fn from(reference: &NodeReference) -> Self {
        SnapshotReference {
            store_name: reference.store_name.clone(),
            key: reference.key.as_u64(),
        }
    }
}

impl From<SnapshotReference> for NodeReference {
    fn from(wire: SnapshotReference) -> Self {
        NodeReference::new(wire.store_name, NodeKey::new(wire.key))
    }
}

/// One entity instance: a key, a flat property map, and named reference
/// lists to other nodes.
///
/// Nodes are plain values. The store keeps its own copy on every write and
/// hands out copies on every read, so a `Node` held by a caller never
/// aliases store-internal state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    key: Option<NodeKey>,
    store_name: String,
    properties: BTreeMap<String, Value>,
    related: BTreeMap<String, Vec<NodeReference>>,
    children: BTreeMap<String, Vec<NodeReference>>,
}

impl Node {
    /// Creates an empty node for the named store, with no key assigned.
    pub fn new(store_name: impl Into<String>) -> Self {
        Self {
            store_name: store_name.into(),
            ..Self::default()
        }
    }

    /// The node's key, unset until the node has been created in a store.
    pub fn key(&self) -> Option<NodeKey> {
        self.key
    }

    /// Assigns the node's key.
    pub fn set_key(&mut self, key: NodeKey) {
        self.key = Some(key);
    }

    /// Name of the store this node belongs to.
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// Builds a reference to this node. `None` until a key is assigned.
    pub fn reference(&self) -> Option<NodeReference> {
        self.key.map(|key| NodeReference::new(&self.store_name, key))
    }

    /// The flat property map.
    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    /// Looks up a property value.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Sets a property value.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Sets a property value, builder style.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Removes a property value.
    pub fn remove_property(&mut self, name: &str) -> Option<Value> {
        self.properties.remove(name)
    }

    /// Relationship name to outgoing reference lists.
    pub fn related(&self) -> &BTreeMap<String, Vec<NodeReference>> {
        &self.related
    }

    /// References stored under one relationship name.
    pub fn related_under(&self, relationship: &str) -> &[NodeReference] {
        self.related.get(relationship).map_or(&[], Vec::as_slice)
    }

    /// Replaces the reference list under a relationship name.
    pub fn set_related(&mut self, relationship: impl Into<String>, references: Vec<NodeReference>) {
        self.related.insert(relationship.into(), references);
    }

    /// Appends references under a relationship name.
    pub fn add_related(&mut self, relationship: impl Into<String>, references: Vec<NodeReference>) {
        self.related.entry(relationship.into()).or_default().extend(references);
    }

    /// Removes one reference from a relationship list.
    ///
    /// Returns `true` when the reference was present. The (possibly empty)
    /// list is kept in place, matching snapshot shape.
    pub fn remove_related(&mut self, relationship: &str, reference: &NodeReference) -> bool {
        match self.related.get_mut(relationship) {
            Some(references) => {
                let before = references.len();
                references.retain(|r| r != reference);
                references.len() < before
            }
            None => false,
        }
    }

    /// Hierarchical containment references (parallel structure to `related`).
    pub fn children(&self) -> &BTreeMap<String, Vec<NodeReference>> {
        &self.children
    }

    /// Replaces the child reference list under a name.
    pub fn set_children(&mut self, name: impl Into<String>, references: Vec<NodeReference>) {
        self.children.insert(name.into(), references);
    }

    /// Converts this node to its snapshot record. Requires a key.
    pub(crate) fn to_snapshot(&self) -> Option<SnapshotNode> {
        let key = self.key?;
        Some(SnapshotNode {
            key: key.as_u64(),
            store_name: self.store_name.clone(),
            properties: self.properties.clone(),
            related: to_wire_refs(&self.related),
            children: to_wire_refs(&self.children),
        })
    }

    /// Rebuilds a node from its snapshot record.
    pub(crate) fn from_snapshot(wire: SnapshotNode) -> Self {
        Self {
            key: Some(NodeKey::new(wire.key)),
            store_name: wire.store_name,
            properties: wire.properties,
            related: from_wire_refs(wire.related),
            children: from_wire_refs(wire.children),
        }
    }
}

fn to_wire_refs(
    references: &BTreeMap<String, Vec<NodeReference>>,
) -> BTreeMap<String, Vec<SnapshotReference>> {
    references
        .iter()
        .map(|(name, list)| (name.clone(), list.iter().map(Into::into).collect()))
        .collect()
}

fn from_wire_refs(
    wire: BTreeMap<String, Vec<SnapshotReference>>,
) -> BTreeMap<String, Vec<NodeReference>> {
    wire.into_iter()
        .map(|(name, list)| (name, list.into_iter().map(Into::into).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_equality_is_structural() {
        let a = NodeReference::new("sample.Task", NodeKey::new(3));
        let b = NodeReference::new("sample.Task", NodeKey::new(3));
        let c = NodeReference::new("sample.Task", NodeKey::new(4));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn reference_display() {
        let reference = NodeReference::new("sample.Task", NodeKey::new(3));
        assert_eq!(reference.to_string(), "sample.Task@3");
    }

    #[test]
    fn node_reference_requires_key() {
        let mut node = Node::new("sample.Task");
        assert!(node.reference().is_none());
        node.set_key(NodeKey::new(9));
        assert_eq!(
            node.reference(),
            Some(NodeReference::new("sample.Task", NodeKey::new(9)))
        );
    }

    #[test]
    fn remove_related_reports_presence() {
        let target = NodeReference::new("sample.User", NodeKey::new(1));
        let mut node = Node::new("sample.Task");
        node.set_related("assignee", vec![target.clone()]);

        assert!(node.remove_related("assignee", &target));
        assert!(!node.remove_related("assignee", &target));
        // The emptied list stays in place
        assert!(node.related().contains_key("assignee"));
        assert!(node.related_under("assignee").is_empty());
    }

    #[test]
    fn remove_property_returns_the_old_value() {
        let mut node = Node::new("sample.Task").with_property("title", "draft");
        assert_eq!(
            node.remove_property("title"),
            Some(Value::Text("draft".to_string()))
        );
        assert_eq!(node.property("title"), None);
        assert_eq!(node.remove_property("title"), None);
    }

    #[test]
    fn children_survive_the_snapshot_roundtrip() {
        let mut node = Node::new("sample.Order");
        node.set_key(NodeKey::new(3));
        node.set_children(
            "items",
            vec![NodeReference::new("sample.Item", NodeKey::new(8))],
        );

        let back = Node::from_snapshot(node.to_snapshot().unwrap());
        assert_eq!(
            back.children()["items"],
            vec![NodeReference::new("sample.Item", NodeKey::new(8))]
        );
    }

    #[test]
    fn snapshot_roundtrip() {
        let mut node = Node::new("sample.Task")
            .with_property("title", "write release notes")
            .with_property("estimate", 3i64);
        node.set_key(NodeKey::new(7));
        node.set_related(
            "assignee",
            vec![NodeReference::new("sample.User", NodeKey::new(2))],
        );

        let wire = node.to_snapshot().unwrap();
        let back = Node::from_snapshot(wire);
        assert_eq!(back, node);
    }

    #[test]
    fn keyless_node_has_no_snapshot_form() {
        let node = Node::new("sample.Task");
        assert!(node.to_snapshot().is_none());
    }
}
