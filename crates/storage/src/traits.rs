use async_trait::async_trait;
use canvass_core::{Catalog, SubmissionRecord};

use crate::error::StorageError;

/// Durable, append-only collection of submission records.
///
/// ## Contract
///
/// - `append` either stores the whole record or returns an error; it never
///   stores part of one.
/// - `list_all` returns records in append order.
/// - Concurrent `append` calls must not lose writes. Ordering between
///   concurrent appends is unspecified.
/// - Records are not deduplicated: appending two records with different
///   submission ids stores both even if their contents are equal.
///
/// Implementations must be `Send + Sync + 'static` to be shared through
/// axum application state and across async task boundaries.
#[async_trait]
pub trait SubmissionStore: Send + Sync + 'static {
    /// Persist one record.
    async fn append(&self, record: SubmissionRecord) -> Result<(), StorageError>;

    /// Every stored record, oldest first.
    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StorageError>;

    /// Records whose group id equals `group_id` exactly (case-sensitive).
    ///
    /// The default filters [`list_all`](Self::list_all); backends with an
    /// index may override it.
    async fn list_by_group(&self, group_id: &str) -> Result<Vec<SubmissionRecord>, StorageError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .filter(|r| r.group_id() == group_id)
            .collect())
    }
}

/// Persistence for the question catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// The saved catalog, or `None` if nothing has been saved yet.
    async fn load(&self) -> Result<Option<Catalog>, StorageError>;

    /// Replace the saved catalog.
    async fn save(&self, catalog: &Catalog) -> Result<(), StorageError>;
}
