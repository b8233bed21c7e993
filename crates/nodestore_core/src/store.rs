//! One store per entity type: the in-memory node map and the operations
//! that touch only this store's own state.
//!
//! Cross-store semantics (cascades, link delegation, inverse scans) live in
//! the catalog-issued handle; this type never reaches into another store.

use crate::error::{StoreError, StoreResult};
use crate::node::{Node, NodeReference};
use crate::schema::Entity;
use crate::types::{NodeKey, TypeRef};
use nodestore_codec::{Snapshot, Value};
use std::collections::BTreeMap;

/// One filter criterion value: either a property value or a relationship
/// reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Matches a property whose value equals this one.
    Value(Value),
    /// Matches a relationship holding this reference.
    Reference(NodeReference),
}

impl From<Value> for Criterion {
    fn from(value: Value) -> Self {
        Criterion::Value(value)
    }
}

impl From<NodeReference> for Criterion {
    fn from(reference: NodeReference) -> Self {
        Criterion::Reference(reference)
    }
}

/// Filter criteria: criterion name to the set of allowed values.
///
/// A node matches when, for every entry, either its property value is one
/// of the allowed values, or the allowed references cover every reference
/// it stores under that relationship name.
pub type FilterCriteria = BTreeMap<String, Vec<Criterion>>;

/// The node map for one entity type.
///
/// Owns `key → node`, a monotonic key counter, and a dirty flag gating
/// persistence. Iteration is in key order, so serialization is
/// deterministic. All reads hand out copies; all writes store copies.
#[derive(Debug, Clone)]
pub struct NodeStore {
    type_ref: TypeRef,
    nodes: BTreeMap<NodeKey, Node>,
    next_key: u64,
    dirty: bool,
}

impl NodeStore {
    /// Creates an empty store for the given entity type.
    pub fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            nodes: BTreeMap::new(),
            next_key: 0,
            dirty: false,
        }
    }

    /// Rebuilds a store from a decoded snapshot.
    ///
    /// The key counter resumes past the largest stored key, so keys
    /// assigned after a reload never collide with persisted ones.
    pub fn from_snapshot(type_ref: TypeRef, snapshot: Snapshot) -> Self {
        let next_key = snapshot.max_key();
        let nodes = snapshot
            .nodes
            .into_values()
            .map(|wire| (NodeKey::new(wire.key), Node::from_snapshot(wire)))
            .collect();
        Self {
            type_ref,
            nodes,
            next_key,
            dirty: false,
        }
    }

    /// Converts the full node map to its snapshot document.
    pub fn to_snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for (key, node) in &self.nodes {
            if let Some(wire) = node.to_snapshot() {
                snapshot.nodes.insert(key.as_u64(), wire);
            }
        }
        snapshot
    }

    /// The entity type this store holds.
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// The store name: the entity type's full name.
    pub fn name(&self) -> String {
        self.type_ref.full_name()
    }

    /// Whether the store has unsaved mutations.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Returns the next unique key for this store.
    pub fn generate_key(&mut self) -> NodeKey {
        self.next_key += 1;
        NodeKey::new(self.next_key)
    }

    /// Creates a node, assigning a key when the node has none.
    ///
    /// Properties flagged `unique && auto_generated` on the entity default
    /// to the string form of the key when absent. No other validation
    /// happens here; constraint checking is a separate explicit pass.
    pub fn create_node(&mut self, mut node: Node, entity: &Entity) -> NodeKey {
        let key = match node.key() {
            Some(key) => {
                // Keep the counter ahead of explicitly supplied keys
                self.next_key = self.next_key.max(key.as_u64());
                key
            }
            None => {
                let key = self.generate_key();
                node.set_key(key);
                key
            }
        };
        for property in &entity.properties {
            if property.unique
                && property.auto_generated
                && node.property(&property.name).is_none()
            {
                node.set_property(property.name.clone(), key.to_string());
            }
        }
        self.nodes.insert(key, node);
        self.mark_dirty();
        key
    }

    /// Whether a node with the given key exists.
    pub fn contains_node(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Returns a copy of the node, or `None` when absent.
    pub fn get_node(&self, key: NodeKey) -> Option<Node> {
        self.nodes.get(&key).cloned()
    }

    /// Every key in the store, in key order.
    pub fn node_keys(&self) -> Vec<NodeKey> {
        self.nodes.keys().copied().collect()
    }

    /// A copy of every node, in key order.
    pub fn nodes(&self) -> Vec<Node> {
        self.nodes.values().cloned().collect()
    }

    /// Number of nodes in the store.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the store holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&NodeKey, &Node)> {
        self.nodes.iter()
    }

    /// Overwrites the node under its key: upsert semantics, no existence
    /// check.
    pub fn update_node(&mut self, node: Node) -> StoreResult<()> {
        let key = node
            .key()
            .ok_or_else(|| StoreError::validation("cannot update a node without a key"))?;
        self.nodes.insert(key, node);
        self.mark_dirty();
        Ok(())
    }

    /// Removes the node map entry, without any cascade handling.
    pub(crate) fn remove_node(&mut self, key: NodeKey) -> Option<Node> {
        let removed = self.nodes.remove(&key);
        if removed.is_some() {
            self.mark_dirty();
        }
        removed
    }

    /// Replaces the reference list under a relationship on a stored node.
    pub(crate) fn set_related(
        &mut self,
        key: NodeKey,
        relationship: &str,
        references: Vec<NodeReference>,
    ) -> StoreResult<()> {
        let node = self.stored_node_mut(key)?;
        node.set_related(relationship, references);
        self.mark_dirty();
        Ok(())
    }

    /// Appends references under a relationship on a stored node.
    pub(crate) fn add_related(
        &mut self,
        key: NodeKey,
        relationship: &str,
        references: Vec<NodeReference>,
    ) -> StoreResult<()> {
        let node = self.stored_node_mut(key)?;
        node.add_related(relationship, references);
        self.mark_dirty();
        Ok(())
    }

    /// Removes one reference from a relationship list on a stored node.
    ///
    /// Returns whether the reference was present.
    pub(crate) fn remove_related(
        &mut self,
        key: NodeKey,
        relationship: &str,
        reference: &NodeReference,
    ) -> StoreResult<bool> {
        let node = self.stored_node_mut(key)?;
        let removed = node.remove_related(relationship, reference);
        self.mark_dirty();
        Ok(removed)
    }

    fn stored_node_mut(&mut self, key: NodeKey) -> StoreResult<&mut Node> {
        let name = self.name();
        self.nodes.get_mut(&key).ok_or_else(|| {
            StoreError::validation(format!("no node {key} in store {name}"))
        })
    }

    /// Linear-scan filter over every node.
    pub fn filter(&self, criteria: &FilterCriteria, limit: Option<usize>) -> Vec<NodeKey> {
        self.nodes
            .iter()
            .filter(|(_, node)| Self::matches(node, criteria))
            .map(|(key, _)| *key)
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }

    fn matches(node: &Node, criteria: &FilterCriteria) -> bool {
        criteria.iter().all(|(name, allowed)| {
            Self::matches_property(node, name, allowed)
                || Self::matches_relationship(node, name, allowed)
        })
    }

    fn matches_property(node: &Node, name: &str, allowed: &[Criterion]) -> bool {
        match node.property(name) {
            Some(value) => allowed
                .iter()
                .any(|criterion| matches!(criterion, Criterion::Value(v) if v == value)),
            None => false,
        }
    }

    fn matches_relationship(node: &Node, name: &str, allowed: &[Criterion]) -> bool {
        if !node.related().contains_key(name) {
            return false;
        }
        node.related_under(name).iter().all(|reference| {
            allowed
                .iter()
                .any(|criterion| matches!(criterion, Criterion::Reference(r) if r == reference))
        })
    }

    /// Whole-store constraint pass: required properties present, unique
    /// property values pairwise distinct, required primary relationships
    /// non-empty.
    ///
    /// Read-only diagnostic; callers invoke it explicitly (e.g. before a
    /// checkpoint), never automatically on mutation.
    pub fn validate_constraints(&self, entity: &Entity) -> StoreResult<()> {
        let mut found_values: BTreeMap<&str, Vec<&Value>> = BTreeMap::new();
        for (key, node) in &self.nodes {
            for property in &entity.properties {
                let value = node.property(&property.name);
                if property.required && !property.auto_generated {
                    let missing = value.is_none() || value.is_some_and(Value::is_null);
                    if missing {
                        return Err(StoreError::validation(format!(
                            "Missing value for {}/{}",
                            entity.label, property.label
                        )));
                    }
                }
                if property.unique {
                    if let Some(value) = value {
                        let seen = found_values.entry(&property.name).or_default();
                        if seen.contains(&value) {
                            return Err(StoreError::validation(format!(
                                "Value must be unique: {}/{} ({})",
                                entity.label, property.label, value
                            )));
                        }
                        seen.push(value);
                    }
                }
            }
            for relationship in &entity.relationships {
                if relationship.required
                    && relationship.primary
                    && node.related_under(&relationship.name).is_empty()
                {
                    return Err(StoreError::validation(format!(
                        "Missing link for {}/{} in {}@{}",
                        entity.label, relationship.label, entity.label, key
                    )));
                }
            }
        }
        Ok(())
    }
}
