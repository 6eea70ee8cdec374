use std::future::Future;

use super::{ids, make_record, TestResult};
use crate::SubmissionStore;

pub(super) async fn run_group_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "group",
            "list_by_group_filters_exactly",
            list_by_group_filters_exactly(factory).await,
        ),
        TestResult::from_result(
            "group",
            "list_by_group_is_case_sensitive",
            list_by_group_is_case_sensitive(factory).await,
        ),
        TestResult::from_result(
            "group",
            "unknown_group_lists_nothing",
            unknown_group_lists_nothing(factory).await,
        ),
    ]
}

async fn seeded<S, F, Fut>(factory: &F) -> Result<S, String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory().await;
    for (id, group) in [("1", "Sales"), ("2", "sales"), ("3", "Sales"), ("4", "Ops")] {
        store
            .append(make_record(id, group))
            .await
            .map_err(|e| format!("append {id}: {e}"))?;
    }
    Ok(store)
}

async fn list_by_group_filters_exactly<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = seeded(factory).await?;
    let sales = store
        .list_by_group("Sales")
        .await
        .map_err(|e| format!("list_by_group: {e}"))?;
    if ids(&sales) != ["1", "3"] {
        return Err(format!("expected [1, 3], got {:?}", ids(&sales)));
    }
    Ok(())
}

async fn list_by_group_is_case_sensitive<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = seeded(factory).await?;
    let lower = store
        .list_by_group("sales")
        .await
        .map_err(|e| format!("list_by_group: {e}"))?;
    if ids(&lower) != ["2"] {
        return Err(format!("expected [2], got {:?}", ids(&lower)));
    }
    Ok(())
}

async fn unknown_group_lists_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = seeded(factory).await?;
    let none = store
        .list_by_group("Finance")
        .await
        .map_err(|e| format!("list_by_group: {e}"))?;
    if !none.is_empty() {
        return Err(format!("expected no records, got {:?}", ids(&none)));
    }
    Ok(())
}
