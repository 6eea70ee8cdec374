//! In-process backends. Nothing survives the process.

use async_trait::async_trait;
use canvass_core::{Catalog, SubmissionRecord};
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::traits::{CatalogStore, SubmissionStore};

/// Vector-backed submission store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<SubmissionRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`.
    pub fn with_records(records: Vec<SubmissionRecord>) -> Self {
        InMemoryStore {
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SubmissionStore for InMemoryStore {
    async fn append(&self, record: SubmissionRecord) -> Result<(), StorageError> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StorageError> {
        Ok(self.records.read().await.clone())
    }
}

/// Catalog held in memory; starts empty unless seeded.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    catalog: RwLock<Option<Catalog>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        InMemoryCatalog {
            catalog: RwLock::new(Some(catalog)),
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn load(&self) -> Result<Option<Catalog>, StorageError> {
        Ok(self.catalog.read().await.clone())
    }

    async fn save(&self, catalog: &Catalog) -> Result<(), StorageError> {
        *self.catalog.write().await = Some(catalog.clone());
        Ok(())
    }
}
