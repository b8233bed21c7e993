//! # Nodestore Core
//!
//! Schema-driven node persistence engine.
//!
//! This crate provides:
//! - Typed node records with flat property maps and reference lists
//! - Per-entity-type stores with sequential key assignment
//! - Referential integrity across stores: cascade deletes and scrubbing
//! - Primary/non-primary relationship symmetry with delegation
//! - Constraint validation (required and unique properties, required links)
//! - A catalog with lazy snapshot loading and dirty-gated saves

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cascade;
mod catalog;
mod error;
mod handle;
mod node;
mod schema;
mod store;
mod types;

pub use nodestore_codec::Value;

pub use catalog::NodeStoreCatalog;
pub use error::{StoreError, StoreResult};
pub use handle::NodeStoreHandle;
pub use node::{Node, NodeReference};
pub use schema::{Entity, Property, Relationship, RelationshipStyle, Schema};
pub use store::{Criterion, FilterCriteria, NodeStore};
pub use types::{NodeKey, TypeRef};
