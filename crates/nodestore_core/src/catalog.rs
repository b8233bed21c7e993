//! Store registry and cross-store resolution.
//!
//! The catalog is the only component that constructs stores, guaranteeing
//! one store instance per entity type per catalog. Stores materialize
//! lazily: the first access loads the type's snapshot file, or starts an
//! empty store when no file exists yet.
//!
//! Snapshot layout under the catalog root:
//!
//! ```text
//! <root>/
//! ├─ <namespace>/
//! │  ├─ <Name>.json      # one snapshot per entity type
//! │  └─ ...
//! └─ ...
//! ```

use crate::error::StoreResult;
use crate::handle::NodeStoreHandle;
use crate::node::{Node, NodeReference};
use crate::schema::Schema;
use crate::store::NodeStore;
use crate::types::TypeRef;
use nodestore_codec::{decode_snapshot, encode_snapshot};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Shared catalog state reachable from every issued handle.
pub(crate) struct CatalogShared {
    pub(crate) schema: Schema,
    root: PathBuf,
    stores: RwLock<HashMap<TypeRef, Arc<RwLock<NodeStore>>>>,
}

impl CatalogShared {
    fn store_path(&self, type_ref: &TypeRef) -> PathBuf {
        let mut path = self.root.clone();
        if !type_ref.namespace.is_empty() {
            path.push(&type_ref.namespace);
        }
        path.push(format!("{}.json", type_ref.name));
        path
    }

    /// Returns the store cell for a type, loading it on first access.
    pub(crate) fn store_cell(&self, type_ref: &TypeRef) -> StoreResult<Arc<RwLock<NodeStore>>> {
        if let Some(cell) = self.stores.read().get(type_ref) {
            return Ok(Arc::clone(cell));
        }
        let mut stores = self.stores.write();
        // Another handle may have loaded it while we waited
        if let Some(cell) = stores.get(type_ref) {
            return Ok(Arc::clone(cell));
        }
        let store = self.load_store(type_ref)?;
        let cell = Arc::new(RwLock::new(store));
        stores.insert(type_ref.clone(), Arc::clone(&cell));
        Ok(cell)
    }

    fn load_store(&self, type_ref: &TypeRef) -> StoreResult<NodeStore> {
        let path = self.store_path(type_ref);
        match fs::read_to_string(&path) {
            Ok(text) => {
                debug!(path = %path.display(), "loading snapshot");
                let snapshot = decode_snapshot(&text)?;
                Ok(NodeStore::from_snapshot(type_ref.clone(), snapshot))
            }
            // No file yet: a fresh, empty store
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Ok(NodeStore::new(type_ref.clone()))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Persists a store if dirty; a clean store is a no-op.
    pub(crate) fn save_store(&self, store: &mut NodeStore) -> StoreResult<()> {
        if !store.is_dirty() {
            return Ok(());
        }
        let path = self.store_path(store.type_ref());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = encode_snapshot(&store.to_snapshot())?;
        fs::write(&path, text)?;
        store.clear_dirty();
        debug!(path = %path.display(), "saved snapshot");
        Ok(())
    }

    /// Looks up the node a reference points at.
    ///
    /// Returns `None` when the schema has no such store or the store has
    /// no such key.
    pub(crate) fn resolve(&self, reference: &NodeReference) -> StoreResult<Option<Node>> {
        let type_ref = TypeRef::parse(reference.store_name());
        if self.schema.entity(&type_ref).is_none() {
            return Ok(None);
        }
        let cell = self.store_cell(&type_ref)?;
        let node = cell.read().get_node(reference.key());
        Ok(node)
    }
}

/// Session-scoped registry mapping entity types to their stores.
///
/// Passed explicitly wherever store operations need cross-store access;
/// there is no ambient or process-wide catalog. A catalog and its stores
/// are owned by one logical session: callers must not run two mutating
/// operations concurrently.
pub struct NodeStoreCatalog {
    shared: Arc<CatalogShared>,
}

impl NodeStoreCatalog {
    /// Creates a catalog over a snapshot root directory.
    ///
    /// No I/O happens here; stores load lazily on first access.
    pub fn new(schema: Schema, root: impl Into<PathBuf>) -> Self {
        Self {
            shared: Arc::new(CatalogShared {
                schema,
                root: root.into(),
                stores: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The shared read-only entity metadata.
    pub fn schema(&self) -> &Schema {
        &self.shared.schema
    }

    /// The snapshot root directory.
    pub fn root(&self) -> &Path {
        &self.shared.root
    }

    /// The snapshot file path for an entity type.
    pub fn store_path(&self, type_ref: &TypeRef) -> PathBuf {
        self.shared.store_path(type_ref)
    }

    /// Returns the store handle for an entity type, loading the store
    /// from its snapshot on first access.
    pub fn store(&self, type_ref: &TypeRef) -> StoreResult<NodeStoreHandle> {
        if self.shared.schema.entity(type_ref).is_none() {
            return Err(crate::error::StoreError::unknown_entity(type_ref.full_name()));
        }
        self.shared.store_cell(type_ref)?;
        Ok(NodeStoreHandle::new(Arc::clone(&self.shared), type_ref.clone()))
    }

    /// Returns the store handle for a store name (the type's full name).
    pub fn store_by_name(&self, name: &str) -> StoreResult<NodeStoreHandle> {
        self.store(&TypeRef::parse(name))
    }

    /// Looks up the node a reference points at, across stores.
    pub fn resolve(&self, reference: &NodeReference) -> StoreResult<Option<Node>> {
        self.shared.resolve(reference)
    }

    /// Checkpoint: persists every dirty store. Clean stores are skipped.
    pub fn save_all(&self) -> StoreResult<()> {
        let cells: Vec<Arc<RwLock<NodeStore>>> =
            self.shared.stores.read().values().map(Arc::clone).collect();
        for cell in cells {
            let mut store = cell.write();
            self.shared.save_store(&mut store)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for NodeStoreCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeStoreCatalog")
            .field("root", &self.shared.root)
            .field("loaded_stores", &self.shared.stores.read().len())
            .finish_non_exhaustive()
    }
}
