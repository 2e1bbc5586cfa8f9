//! InMemoryDocumentStore - seeded document store for testing and development.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::clan::RawClanDocument;

use super::{ClanStore, StoreError};

/// In-memory document store backed by a `BTreeMap` per collection.
///
/// Id listing is deterministic (sorted by document id). Clone-friendly via
/// Arc: clones share storage. `fail_reads` makes subsequent calls fail, for
/// exercising the refresh failure policy in tests.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<BTreeMap<String, BTreeMap<String, RawClanDocument>>>>,
    fail_reads: Arc<AtomicBool>,
}

impl InMemoryDocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document into a collection, keyed by its clan id.
    pub fn insert(&self, collection: &str, document: RawClanDocument) {
        let mut collections = match self.collections.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(document.clan_id.clone(), document);
    }

    /// Make every subsequent read call fail with a backend error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ClanStore for InMemoryDocumentStore {
    async fn list_document_ids(
        &self,
        collection: &str,
        _parent_path: &str,
    ) -> Result<Vec<String>, StoreError> {
        self.check_available()?;
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(collections
            .get(collection)
            .map(|documents| documents.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn bulk_read(
        &self,
        collection: &str,
        _parent_path: &str,
        ids: &[String],
        _projection: &[&str],
    ) -> Result<Vec<RawClanDocument>, StoreError> {
        self.check_available()?;
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| documents.get(id).cloned())
            .collect())
    }
}
