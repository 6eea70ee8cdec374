//! Conformance test suite for `SubmissionStore` implementations.
//!
//! A backend-agnostic suite that any `SubmissionStore` implementation can
//! run to verify the store contract. The suite covers:
//!
//! - **Append**: appended records are listed back intact, in order
//! - **No dedup**: equal contents under distinct ids are all kept
//! - **Group filter**: `list_by_group` matches exactly and case-sensitively
//! - **Concurrency**: parallel appends lose no writes
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty store for each test:
//!
//! ```ignore
//! use canvass_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn sqlite_conformance() {
//!     let report = run_conformance_suite(|| async { open_test_sqlite().await }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod append;
mod concurrent;
mod group;

use std::fmt;
use std::future::Future;

use canvass_core::{Answer, SubmissionRecord};
use time::OffsetDateTime;

use crate::SubmissionStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "append", "group").
    pub category: String,
    /// Test name (e.g. "append_then_list_returns_record").
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a store backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// store, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(append::run_append_tests(&factory).await);
    results.extend(group::run_group_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn fixed_time() -> OffsetDateTime {
    // 2025-01-01T00:00:00Z
    OffsetDateTime::from_unix_timestamp(1_735_689_600).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

fn make_record(submission_id: &str, group_id: &str) -> SubmissionRecord {
    SubmissionRecord::with_id(
        submission_id,
        group_id,
        vec![Answer::new(1, 3), Answer::new(2, "  keep the raw text  ")],
        fixed_time(),
    )
    .unwrap_or_else(|e| panic!("fixture record invalid: {e}"))
}

fn ids(records: &[SubmissionRecord]) -> Vec<&str> {
    records.iter().map(SubmissionRecord::submission_id).collect()
}
