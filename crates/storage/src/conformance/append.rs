use std::future::Future;

use super::{ids, make_record, TestResult};
use crate::SubmissionStore;

pub(super) async fn run_append_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "append",
            "empty_store_lists_nothing",
            empty_store_lists_nothing(factory).await,
        ),
        TestResult::from_result(
            "append",
            "append_then_list_returns_record",
            append_then_list_returns_record(factory).await,
        ),
        TestResult::from_result(
            "append",
            "list_preserves_append_order",
            list_preserves_append_order(factory).await,
        ),
        TestResult::from_result(
            "append",
            "equal_contents_are_not_deduplicated",
            equal_contents_are_not_deduplicated(factory).await,
        ),
    ]
}

async fn empty_store_lists_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let all = store.list_all().await.map_err(|e| format!("list_all: {e}"))?;
    if !all.is_empty() {
        return Err(format!("expected no records, got {}", all.len()));
    }
    Ok(())
}

/// The listed record must equal the appended one field for field, including
/// untrimmed text answers and the timestamp.
async fn append_then_list_returns_record<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    let record = make_record("sub-1", "G1");
    store
        .append(record.clone())
        .await
        .map_err(|e| format!("append: {e}"))?;

    let all = store.list_all().await.map_err(|e| format!("list_all: {e}"))?;
    match all.as_slice() {
        [only] if *only == record => Ok(()),
        [only] => Err(format!("record changed in storage: {only:?}")),
        other => Err(format!("expected 1 record, got {}", other.len())),
    }
}

async fn list_preserves_append_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    for id in ["a", "b", "c"] {
        store
            .append(make_record(id, "G1"))
            .await
            .map_err(|e| format!("append {id}: {e}"))?;
    }
    let all = store.list_all().await.map_err(|e| format!("list_all: {e}"))?;
    if ids(&all) != ["a", "b", "c"] {
        return Err(format!("unexpected order: {:?}", ids(&all)));
    }
    Ok(())
}

/// A retried submit produces a second record with a new id; both are kept.
async fn equal_contents_are_not_deduplicated<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    store
        .append(make_record("first-try", "G1"))
        .await
        .map_err(|e| format!("append first: {e}"))?;
    store
        .append(make_record("retry", "G1"))
        .await
        .map_err(|e| format!("append retry: {e}"))?;
    let all = store.list_all().await.map_err(|e| format!("list_all: {e}"))?;
    if all.len() != 2 {
        return Err(format!("expected 2 records, got {}", all.len()));
    }
    Ok(())
}
