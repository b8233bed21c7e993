//! Cascade planning for node deletion.
//!
//! Deleting a node fans out across stores: nodes whose primary
//! parent-styled relationship points at the deleted node are deleted too
//! (recursively), and every other primary relationship holding a reference
//! to a deleted node gets that reference scrubbed.
//!
//! Cascades are all-or-nothing. The full plan (the deletion set and the
//! reference scrubs) is computed and validated against required
//! relationships before any store is mutated, so a failing cascade leaves
//! every store untouched.

use crate::catalog::CatalogShared;
use crate::error::{StoreError, StoreResult};
use crate::node::NodeReference;
use crate::schema::{Relationship, RelationshipStyle};
use crate::types::{NodeKey, TypeRef};
use std::collections::{BTreeMap, BTreeSet};

/// One reference removal from a surviving node's relationship list.
#[derive(Debug, Clone)]
pub(crate) struct Scrub {
    pub(crate) type_ref: TypeRef,
    pub(crate) key: NodeKey,
    pub(crate) relationship: String,
    pub(crate) reference: NodeReference,
    required: bool,
}

/// The validated mutation set for one deletion.
#[derive(Debug)]
pub(crate) struct CascadePlan {
    pub(crate) deletions: BTreeSet<(TypeRef, NodeKey)>,
    pub(crate) scrubs: Vec<Scrub>,
}

/// Computes the full cascade for deleting one node.
///
/// Walks primary parent-styled relationships transitively to build the
/// deletion set, then records a scrub for every reference a surviving
/// node holds to a deleted one. Read-only: takes each store's lock one at
/// a time and never mutates.
pub(crate) fn plan_delete(
    shared: &CatalogShared,
    start_type: &TypeRef,
    start_key: NodeKey,
) -> StoreResult<CascadePlan> {
    let schema = &shared.schema;
    let mut deletions: BTreeSet<(TypeRef, NodeKey)> = BTreeSet::new();
    let mut scrubs: Vec<Scrub> = Vec::new();
    let mut queue = vec![(start_type.clone(), start_key)];

    while let Some((type_ref, key)) = queue.pop() {
        if !deletions.insert((type_ref.clone(), key)) {
            continue;
        }
        let target = schema
            .entity(&type_ref)
            .ok_or_else(|| StoreError::unknown_entity(type_ref.full_name()))?;
        let removed = NodeReference::new(type_ref.full_name(), key);

        // A relationship hits this node if it targets its type or any supertype
        let mut target_types = vec![type_ref.clone()];
        target_types.extend(target.super_types.iter().cloned());

        for entity in schema.entities() {
            let incoming: Vec<&Relationship> = entity
                .relationships
                .iter()
                .filter(|r| r.primary && target_types.contains(&r.type_ref))
                .collect();
            if incoming.is_empty() {
                continue;
            }
            let cell = shared.store_cell(&entity.type_ref)?;
            let store = cell.read();
            for (other_key, other) in store.iter() {
                for relationship in &incoming {
                    if !other.related_under(&relationship.name).contains(&removed) {
                        continue;
                    }
                    if relationship.style == RelationshipStyle::Parent {
                        // The other node is orphaned: cascade into it
                        queue.push((entity.type_ref.clone(), *other_key));
                    } else {
                        scrubs.push(Scrub {
                            type_ref: entity.type_ref.clone(),
                            key: *other_key,
                            relationship: relationship.name.clone(),
                            reference: removed.clone(),
                            required: relationship.required,
                        });
                    }
                }
            }
        }
    }

    // Scrubs on nodes that are themselves deleted are moot
    scrubs.retain(|scrub| !deletions.contains(&(scrub.type_ref.clone(), scrub.key)));

    let plan = CascadePlan { deletions, scrubs };
    validate(shared, &plan)?;
    Ok(plan)
}

/// Rejects plans that would empty a required relationship on a survivor.
fn validate(shared: &CatalogShared, plan: &CascadePlan) -> StoreResult<()> {
    let mut removed: BTreeMap<(&TypeRef, NodeKey, &str), (bool, Vec<&NodeReference>)> =
        BTreeMap::new();
    for scrub in &plan.scrubs {
        let entry = removed
            .entry((&scrub.type_ref, scrub.key, scrub.relationship.as_str()))
            .or_insert_with(|| (scrub.required, Vec::new()));
        entry.1.push(&scrub.reference);
    }

    for ((type_ref, key, relationship), (required, references)) in &removed {
        if !required {
            continue;
        }
        let cell = shared.store_cell(type_ref)?;
        let store = cell.read();
        let Some(node) = store.get_node(*key) else {
            continue;
        };
        let remaining = node
            .related_under(relationship)
            .iter()
            .filter(|r| !references.contains(r))
            .count();
        if remaining == 0 {
            return Err(StoreError::validation(format!(
                "Relationship {} is required by {}@{}",
                relationship,
                type_ref.full_name(),
                key
            )));
        }
    }
    Ok(())
}

/// Applies a validated plan: scrub references first, then drop the nodes.
pub(crate) fn apply(shared: &CatalogShared, plan: &CascadePlan) -> StoreResult<()> {
    for scrub in &plan.scrubs {
        let cell = shared.store_cell(&scrub.type_ref)?;
        let mut store = cell.write();
        store.remove_related(scrub.key, &scrub.relationship, &scrub.reference)?;
    }
    for (type_ref, key) in &plan.deletions {
        let cell = shared.store_cell(type_ref)?;
        let mut store = cell.write();
        store.remove_node(*key);
    }
    Ok(())
}
