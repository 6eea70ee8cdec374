//! HTTP route handlers: health, question catalog, submissions, results.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use canvass_core::payload::parse_question_id;
use canvass_core::{parse_submission, Catalog, CatalogError, PayloadError, Question, QuestionPayload};
use canvass_storage::StorageError;
use serde::Deserialize;

use super::json_error;
use super::state::AppState;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

// ──────────────────────────────────────────────
// Question catalog
// ──────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum CatalogUpdateError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Store(#[from] StorageError),
}

/// Apply `change` to a copy of the catalog, save the copy, then publish it.
///
/// The write lock is held across the save so concurrent mutations see each
/// other's ids; a failed save leaves the live catalog untouched.
async fn update_catalog<T>(
    state: &AppState,
    change: impl FnOnce(&mut Catalog) -> Result<T, CatalogError>,
) -> Result<T, CatalogUpdateError> {
    let mut live = state.catalog.write().await;
    let mut next = live.clone();
    let out = change(&mut next)?;
    state.stores.catalog.save(&next).await?;
    *live = next;
    Ok(out)
}

fn catalog_failure(err: CatalogUpdateError, store_message: &str) -> Response {
    match err {
        CatalogUpdateError::Catalog(e @ CatalogError::NotFound { .. }) => {
            json_error(StatusCode::NOT_FOUND, &e.to_string()).into_response()
        }
        CatalogUpdateError::Catalog(e) => {
            json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response()
        }
        CatalogUpdateError::Store(e) => {
            tracing::error!(error = %e, "catalog save failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, store_message).into_response()
        }
    }
}

fn parse_question_payload(body: &str) -> Result<QuestionPayload, PayloadError> {
    serde_json::from_str(body).map_err(|_| PayloadError::InvalidJson)
}

/// GET /api/questions
pub(crate) async fn handle_list_questions(State(state): State<Arc<AppState>>) -> Response {
    let catalog = state.catalog.read().await;
    (StatusCode::OK, Json(catalog.questions())).into_response()
}

/// POST /api/questions
pub(crate) async fn handle_create_question(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Response {
    let draft = match parse_question_payload(&body).and_then(QuestionPayload::into_draft) {
        Ok(d) => d,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response(),
    };

    match update_catalog(&state, |c| Ok(c.add(draft).clone())).await {
        Ok(question) => {
            tracing::info!(id = question.id(), "question created");
            (StatusCode::CREATED, Json(question)).into_response()
        }
        Err(e) => catalog_failure(e, "Failed to create question"),
    }
}

/// PUT /api/questions
pub(crate) async fn handle_update_question(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Response {
    let question = match parse_question_payload(&body).and_then(Question::try_from) {
        Ok(q) => q,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response(),
    };

    match update_catalog(&state, |c| c.update(question).cloned()).await {
        Ok(question) => {
            tracing::info!(id = question.id(), "question updated");
            (StatusCode::OK, Json(question)).into_response()
        }
        Err(e) => catalog_failure(e, "Failed to update question"),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteParams {
    id: Option<String>,
}

/// DELETE /api/questions?id=N
pub(crate) async fn handle_delete_question(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteParams>,
) -> Response {
    let id = match parse_question_id(params.id.as_deref()) {
        Ok(id) => id,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response(),
    };

    match update_catalog(&state, |c| c.remove(id)).await {
        Ok(deleted) => {
            tracing::info!(id, "question deleted");
            let body = serde_json::json!({
                "message": "Question deleted successfully",
                "deletedQuestion": deleted,
            });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => catalog_failure(e, "Failed to delete question"),
    }
}

// ──────────────────────────────────────────────
// Submissions and results
// ──────────────────────────────────────────────

/// POST /api/submit-survey
pub(crate) async fn handle_submit_survey(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Response {
    let record = match parse_submission(&body) {
        Ok(r) => r,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response(),
    };

    let submission_id = record.submission_id().to_string();
    match state.stores.submissions.append(record).await {
        Ok(()) => {
            tracing::info!(%submission_id, "survey submitted");
            let body = serde_json::json!({ "message": "Survey submitted successfully." });
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(%submission_id, error = %e, "submission append failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save survey data")
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsParams {
    group: Option<String>,
}

/// GET /api/results?group=G
pub(crate) async fn handle_results(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResultsParams>,
) -> Response {
    let records = match state.stores.submissions.list_all().await {
        Ok(r) => r,
        Err(e) => return load_failure(e),
    };
    let group = params.group.as_deref().filter(|g| !g.is_empty());
    let catalog = state.catalog.read().await;
    let report = canvass_report::aggregate(&records, &catalog, group);
    (StatusCode::OK, Json(report)).into_response()
}

/// GET /api/groups
pub(crate) async fn handle_groups(State(state): State<Arc<AppState>>) -> Response {
    match state.stores.submissions.list_all().await {
        Ok(records) => (StatusCode::OK, Json(canvass_report::group_ids(&records))).into_response(),
        Err(e) => load_failure(e),
    }
}

fn load_failure(err: StorageError) -> Response {
    tracing::error!(error = %err, "loading submissions failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load survey data").into_response()
}
