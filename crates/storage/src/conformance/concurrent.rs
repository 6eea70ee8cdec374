use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use super::{make_record, TestResult};
use crate::{StorageError, SubmissionStore};

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "concurrent",
            "concurrent_appends_lose_nothing",
            concurrent_appends_lose_nothing(factory).await,
        ),
        TestResult::from_result(
            "concurrent",
            "reads_during_appends_see_whole_records",
            reads_during_appends_see_whole_records(factory).await,
        ),
    ]
}

// ── Concurrent appends: every write lands ───────────────────────────────────

/// N tasks append one record each in parallel. All N must be listed
/// afterwards, each exactly once.
async fn concurrent_appends_lose_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = store.clone();
        handles.push(tokio::spawn(async move {
            s.append(make_record(&format!("sub-{i}"), &format!("G{}", i % 3)))
                .await
        }));
    }
    for handle in handles {
        handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StorageError| format!("storage error: {e}"))?;
    }

    let all = store.list_all().await.map_err(|e| format!("list_all: {e}"))?;
    if all.len() != N {
        return Err(format!("expected {N} records, got {}", all.len()));
    }
    let distinct: BTreeSet<_> = all.iter().map(|r| r.submission_id().to_string()).collect();
    if distinct.len() != N {
        return Err(format!("expected {N} distinct ids, got {}", distinct.len()));
    }
    Ok(())
}

/// Listing while appends are in flight must never fail or return a
/// partially written record.
async fn reads_during_appends_see_whole_records<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: SubmissionStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);

    let writer = {
        let s = store.clone();
        tokio::spawn(async move {
            for i in 0..N {
                s.append(make_record(&format!("w-{i}"), "G1")).await?;
            }
            Ok::<_, StorageError>(())
        })
    };

    for _ in 0..N {
        let snapshot = store
            .list_all()
            .await
            .map_err(|e| format!("list_all during writes: {e}"))?;
        if snapshot.iter().any(|r| r.group_id() != "G1") {
            return Err("read returned a mangled record".to_string());
        }
        tokio::task::yield_now().await;
    }

    writer
        .await
        .map_err(|e| format!("task panic: {e}"))?
        .map_err(|e| format!("storage error: {e}"))?;
    let all = store.list_all().await.map_err(|e| format!("list_all: {e}"))?;
    if all.len() != N {
        return Err(format!("expected {N} records, got {}", all.len()));
    }
    Ok(())
}
