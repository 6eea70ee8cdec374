//! Opens the configured stores and loads the catalog.

use std::sync::Arc;

use canvass_core::Catalog;
use canvass_storage::{CatalogStore, JsonCatalogFile, JsonLinesStore, StorageError, SubmissionStore};

use crate::config::StorageConfig;

/// Submission and catalog backends shared by every command.
#[derive(Clone)]
pub(crate) struct Stores {
    pub(crate) submissions: Arc<dyn SubmissionStore>,
    pub(crate) catalog: Arc<dyn CatalogStore>,
}

impl Stores {
    pub(crate) fn open(config: &StorageConfig) -> Self {
        tracing::debug!(
            catalog = %config.catalog_path.display(),
            submissions = %config.submissions_path.display(),
            "opening stores"
        );
        Stores {
            submissions: Arc::new(JsonLinesStore::new(&config.submissions_path)),
            catalog: Arc::new(JsonCatalogFile::new(&config.catalog_path)),
        }
    }

    /// The saved catalog, or the built-in questions if none was saved.
    pub(crate) async fn load_catalog(&self) -> Result<Catalog, StorageError> {
        match self.catalog.load().await? {
            Some(catalog) => {
                tracing::info!(questions = catalog.len(), "catalog loaded");
                Ok(catalog)
            }
            None => {
                tracing::info!("no saved catalog, using built-in questions");
                Ok(Catalog::default_questions())
            }
        }
    }
}
