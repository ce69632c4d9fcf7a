//! In-memory model store and per-kind proxies.
//!
//! The store keeps every value written under a key, so a key written twice
//! yields two records on read. Proxies surface that as-is; deciding whether
//! more than one value is acceptable is the caller's job.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::record::{DataModelType, ModelRecord};

type Bucket = BTreeMap<String, Vec<ModelRecord>>;

/// Shared in-memory key/value store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<DataModelType, Bucket>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under the record's kind and id.
    pub fn add(&self, record: impl Into<ModelRecord>) {
        let record = record.into();
        self.data
            .write()
            .entry(record.kind())
            .or_default()
            .entry(record.id().to_string())
            .or_default()
            .push(record);
    }

    /// Replaces every value under the record's kind and id.
    pub fn put(&self, record: impl Into<ModelRecord>) {
        let record = record.into();
        self.data
            .write()
            .entry(record.kind())
            .or_default()
            .insert(record.id().to_string(), vec![record]);
    }

    /// Removes a key. Returns true if it existed.
    pub fn remove(&self, kind: DataModelType, id: &str) -> bool {
        self.data
            .write()
            .get_mut(&kind)
            .is_some_and(|bucket| bucket.remove(id).is_some())
    }

    /// All values under a key, or `None` if the key is absent.
    pub fn get(&self, kind: DataModelType, id: &str) -> Option<Vec<ModelRecord>> {
        self.data
            .read()
            .get(&kind)
            .and_then(|bucket| bucket.get(id))
            .filter(|values| !values.is_empty())
            .cloned()
    }

    /// Every value of a kind, ordered by key.
    pub fn list(&self, kind: DataModelType) -> Vec<ModelRecord> {
        self.data
            .read()
            .get(&kind)
            .map(|bucket| bucket.values().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of keys held for a kind.
    pub fn len(&self, kind: DataModelType) -> usize {
        self.data.read().get(&kind).map_or(0, BTreeMap::len)
    }
}

/// Accessor bound to one kind of record.
#[derive(Debug, Clone)]
pub struct ModelProxy {
    kind: DataModelType,
    store: MemoryStore,
}

impl ModelProxy {
    pub fn new(kind: DataModelType, store: MemoryStore) -> Self {
        Self { kind, store }
    }

    pub fn kind(&self) -> DataModelType {
        self.kind
    }

    /// Values stored under `id`.
    pub fn get(&self, id: &str) -> Option<Vec<ModelRecord>> {
        self.store.get(self.kind, id)
    }

    /// All values of this proxy's kind.
    pub fn list(&self) -> Vec<ModelRecord> {
        self.store.list(self.kind)
    }
}
