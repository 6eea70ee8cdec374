//! canvass-core: survey data model and the question catalog.
//!
//! Everything the survey session, the aggregation engine and the HTTP
//! boundary agree on lives here:
//!
//! - [`Question`], [`Answer`], [`SubmissionRecord`] -- the data model
//! - [`Catalog`] -- the ordered question list, the single source of truth
//!   for both collection and reporting
//! - [`payload`] -- boundary parsing of submission and question JSON
//! - [`ValidationError`], [`PayloadError`], [`CatalogError`] -- error types

pub mod catalog;
pub mod error;
pub mod model;
pub mod payload;
pub mod validate;

pub use catalog::{Catalog, QuestionDraft};
pub use error::{CatalogError, PayloadError, ValidationError};
pub use model::{Answer, AnswerValue, Question, QuestionId, QuestionKind, ScaleOption, SubmissionRecord};
pub use payload::{parse_submission, QuestionPayload};
