//! Catalog-issued store handles.
//!
//! A handle is how callers operate on one entity type's store. It carries
//! the shared catalog state, so operations that cross relationship
//! boundaries (cascade deletes, link delegation, inverse scans) can
//! reach the other stores involved. Locks are taken one store at a time
//! and never held across a call into another store.

use crate::cascade;
use crate::catalog::CatalogShared;
use crate::error::{StoreError, StoreResult};
use crate::node::{Node, NodeReference};
use crate::schema::{Entity, Relationship, RelationshipStyle};
use crate::store::{FilterCriteria, NodeStore};
use crate::types::{NodeKey, TypeRef};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::warn;

/// Handle to the store of one entity type.
///
/// Obtained from [`NodeStoreCatalog::store`](crate::NodeStoreCatalog::store).
/// Cheap to clone; all clones address the same underlying store.
#[derive(Clone)]
pub struct NodeStoreHandle {
    shared: Arc<CatalogShared>,
    type_ref: TypeRef,
}

impl NodeStoreHandle {
    pub(crate) fn new(shared: Arc<CatalogShared>, type_ref: TypeRef) -> Self {
        Self { shared, type_ref }
    }

    /// The entity type this store holds.
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// The store name (the entity type's full name).
    pub fn name(&self) -> String {
        self.type_ref.full_name()
    }

    fn entity(&self) -> StoreResult<&Entity> {
        self.shared
            .schema
            .entity(&self.type_ref)
            .ok_or_else(|| StoreError::unknown_entity(self.type_ref.full_name()))
    }

    fn relationship(&self, name: &str) -> StoreResult<Relationship> {
        self.entity()?
            .relationship(name)
            .cloned()
            .ok_or_else(|| StoreError::unknown_relationship(self.type_ref.full_name(), name))
    }

    fn cell(&self) -> StoreResult<Arc<RwLock<NodeStore>>> {
        self.shared.store_cell(&self.type_ref)
    }

    fn handle_for(&self, type_ref: &TypeRef) -> NodeStoreHandle {
        NodeStoreHandle::new(Arc::clone(&self.shared), type_ref.clone())
    }

    fn handle_for_store(&self, store_name: &str) -> NodeStoreHandle {
        self.handle_for(&TypeRef::parse(store_name))
    }

    fn self_reference(&self, key: NodeKey) -> NodeReference {
        NodeReference::new(self.name(), key)
    }

    /// Creates a node, assigning a key when the node has none, and returns
    /// the key. Unique auto-generated properties default to the string
    /// form of the key.
    pub fn create_node(&self, node: Node) -> StoreResult<NodeKey> {
        let entity = self.entity()?;
        Ok(self.cell()?.write().create_node(node, entity))
    }

    /// Returns a copy of the node, or `None` when absent.
    pub fn get_node(&self, key: NodeKey) -> StoreResult<Option<Node>> {
        Ok(self.cell()?.read().get_node(key))
    }

    /// Whether a node with the given key exists.
    pub fn contains_node(&self, key: NodeKey) -> StoreResult<bool> {
        Ok(self.cell()?.read().contains_node(key))
    }

    /// Every key in the store.
    pub fn node_keys(&self) -> StoreResult<Vec<NodeKey>> {
        Ok(self.cell()?.read().node_keys())
    }

    /// A copy of every node.
    pub fn nodes(&self) -> StoreResult<Vec<Node>> {
        Ok(self.cell()?.read().nodes())
    }

    /// Overwrites the node under its key: upsert, no existence check.
    pub fn update_node(&self, node: Node) -> StoreResult<()> {
        self.cell()?.write().update_node(node)
    }

    /// Deletes a node and everything that must follow it: child nodes
    /// over primary parent-styled relationships (recursively), and every
    /// reference other nodes hold to a deleted node.
    ///
    /// All-or-nothing: the whole cascade is validated before anything is
    /// mutated, so a required-relationship violation leaves every store
    /// unchanged. Absent keys are a no-op.
    pub fn delete_node(&self, key: NodeKey) -> StoreResult<()> {
        if !self.cell()?.read().contains_node(key) {
            return Ok(());
        }
        let plan = cascade::plan_delete(&self.shared, &self.type_ref, key)?;
        cascade::apply(&self.shared, &plan)
    }

    /// Links one node under a single-valued relationship.
    ///
    /// On the primary side the reference list is replaced with the new
    /// reference. On a non-primary side the call is delegated to the
    /// opposite relationship on the target store, so the primary side
    /// stays the single source of truth.
    pub fn link_nodes(
        &self,
        key: NodeKey,
        relationship: &str,
        reference: NodeReference,
    ) -> StoreResult<()> {
        let rel = self.relationship(relationship)?;
        if rel.primary {
            self.cell()?
                .write()
                .set_related(key, relationship, vec![reference])
        } else {
            let other = self.handle_for_store(reference.store_name());
            other.link_nodes(reference.key(), &rel.opposite, self.self_reference(key))
        }
    }

    /// Links several nodes under a relationship.
    ///
    /// On the primary side, `replace` swaps the whole list; otherwise the
    /// references are appended. On a non-primary side each reference is
    /// delegated to the opposite relationship, appending when the
    /// opposite is multi-valued and replacing when single-valued.
    pub fn link_multiple_nodes(
        &self,
        key: NodeKey,
        relationship: &str,
        references: Vec<NodeReference>,
        replace: bool,
    ) -> StoreResult<()> {
        let rel = self.relationship(relationship)?;
        if rel.primary {
            let cell = self.cell()?;
            let mut store = cell.write();
            if replace {
                store.set_related(key, relationship, references)
            } else {
                store.add_related(key, relationship, references)
            }
        } else {
            let opposite = self.shared.schema.opposite(&rel).ok_or_else(|| {
                StoreError::unknown_relationship(rel.type_ref.full_name(), rel.opposite.clone())
            })?;
            let opposite_name = opposite.name.clone();
            let opposite_multiple = opposite.multiple;
            for reference in references {
                let other = self.handle_for_store(reference.store_name());
                let back_reference = self.self_reference(key);
                if opposite_multiple {
                    other.link_multiple_nodes(
                        reference.key(),
                        &opposite_name,
                        vec![back_reference],
                        false,
                    )?;
                } else {
                    other.link_nodes(reference.key(), &opposite_name, back_reference)?;
                }
            }
            Ok(())
        }
    }

    /// Unlinks one reference from a relationship.
    ///
    /// On the primary side the reference is removed, then containment
    /// styles take effect: a child-styled relationship deletes the
    /// unlinked target, a parent-styled relationship deletes this node
    /// (losing its one parent orphans it). Non-primary sides delegate to
    /// the opposite relationship.
    pub fn unlink_nodes(
        &self,
        key: NodeKey,
        relationship: &str,
        reference: NodeReference,
    ) -> StoreResult<()> {
        let rel = self.relationship(relationship)?;
        if rel.primary {
            self.cell()?.write().remove_related(key, relationship, &reference)?;
            match rel.style {
                RelationshipStyle::Child => {
                    self.handle_for(&rel.type_ref).delete_node(reference.key())
                }
                RelationshipStyle::Parent => self.delete_node(key),
                RelationshipStyle::Link => Ok(()),
            }
        } else {
            let other = self.handle_for(&rel.type_ref);
            other.unlink_nodes(reference.key(), &rel.opposite, self.self_reference(key))
        }
    }

    /// Returns the nodes related to `key` under a relationship.
    ///
    /// On the primary side the stored references are resolved through the
    /// catalog; dangling references are dropped. On a non-primary side
    /// the named related store is linear-scanned for nodes holding a
    /// back-reference under the opposite relationship.
    pub fn get_related_nodes(
        &self,
        key: NodeKey,
        relationship: &str,
        related_store: &str,
    ) -> StoreResult<Vec<Node>> {
        let Some(node) = self.get_node(key)? else {
            return Ok(Vec::new());
        };
        let Some(rel) = self.entity()?.relationship(relationship).cloned() else {
            return Ok(Vec::new());
        };
        if rel.primary {
            let mut related = Vec::new();
            for reference in node.related_under(relationship) {
                match self.shared.resolve(reference)? {
                    Some(target) => related.push(target),
                    None => warn!(%reference, "dropping dangling reference"),
                }
            }
            Ok(related)
        } else {
            let opposite = self.shared.schema.opposite(&rel).ok_or_else(|| {
                StoreError::unknown_relationship(rel.type_ref.full_name(), rel.opposite.clone())
            })?;
            let opposite_name = opposite.name.clone();
            let related_type = TypeRef::parse(related_store);
            if self.shared.schema.entity(&related_type).is_none() {
                return Err(StoreError::unknown_entity(related_store));
            }
            let this_reference = self.self_reference(key);
            let cell = self.shared.store_cell(&related_type)?;
            let store = cell.read();
            Ok(store
                .iter()
                .filter(|(_, other)| other.related_under(&opposite_name).contains(&this_reference))
                .map(|(_, other)| other.clone())
                .collect())
        }
    }

    /// Returns the keys of the nodes related to `key` under a relationship.
    pub fn get_related_node_keys(
        &self,
        key: NodeKey,
        relationship: &str,
        related_store: &str,
    ) -> StoreResult<Vec<NodeKey>> {
        Ok(self
            .get_related_nodes(key, relationship, related_store)?
            .into_iter()
            .filter_map(|node| node.key())
            .collect())
    }

    /// Linear-scan filter; see [`FilterCriteria`] for matching rules.
    pub fn filter(
        &self,
        criteria: &FilterCriteria,
        limit: Option<usize>,
    ) -> StoreResult<Vec<NodeKey>> {
        Ok(self.cell()?.read().filter(criteria, limit))
    }

    /// Read-only whole-store constraint pass.
    pub fn validate_constraints(&self) -> StoreResult<()> {
        let entity = self.entity()?;
        self.cell()?.read().validate_constraints(entity)
    }

    /// Whether the store has unsaved mutations.
    pub fn is_dirty(&self) -> StoreResult<bool> {
        Ok(self.cell()?.read().is_dirty())
    }

    /// Persists this store's snapshot if dirty; a clean store is a no-op.
    pub fn save(&self) -> StoreResult<()> {
        let cell = self.cell()?;
        let mut store = cell.write();
        self.shared.save_store(&mut store)
    }
}

impl std::fmt::Debug for NodeStoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeStoreHandle")
            .field("type_ref", &self.type_ref)
            .finish_non_exhaustive()
    }
}
