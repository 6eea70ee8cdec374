//! canvass-storage: persistence seams for submissions and the catalog.
//!
//! - [`SubmissionStore`] -- append-only collection of submission records
//! - [`CatalogStore`] -- load/save of the question catalog
//! - [`InMemoryStore`], [`InMemoryCatalog`] -- in-process backends for tests
//! - [`JsonLinesStore`], [`JsonCatalogFile`] -- file backends for production
//! - [`conformance`] -- backend-agnostic checks any `SubmissionStore` can run

pub mod conformance;
mod error;
mod file;
mod memory;
mod traits;

pub use error::StorageError;
pub use file::{JsonCatalogFile, JsonLinesStore};
pub use memory::{InMemoryCatalog, InMemoryStore};
pub use traits::{CatalogStore, SubmissionStore};
