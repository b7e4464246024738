use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, ApplicationSummary, StatusUpdate};
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{ApplicationTracker, TrackerError};
use crate::workflows::identity::user_from_headers;

#[derive(Debug, Deserialize)]
pub struct NotesUpdate {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Router builder exposing the applicant's application list and its edits, plus the
/// per-job views used by job pages and employers.
pub fn tracker_router<R>(tracker: Arc<ApplicationTracker<R>>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route("/api/v1/applications", get(list_handler::<R>))
        .route(
            "/api/v1/applications/:application_id",
            delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            patch(status_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/notes",
            patch(notes_handler::<R>),
        )
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(job_applications_handler::<R>),
        )
        .route("/api/v1/jobs/:job_id/applied", get(applied_handler::<R>))
        .with_state(tracker)
}

fn unauthorized() -> Response {
    let payload = json!({
        "error": "sign in required",
    });
    (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
}

fn error_response(error: TrackerError) -> Response {
    let status = match &error {
        TrackerError::AlreadyApplied | TrackerError::Repository(RepositoryError::Conflict) => {
            StatusCode::CONFLICT
        }
        TrackerError::NotAuthorized => StatusCode::FORBIDDEN,
        TrackerError::NotFound | TrackerError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        TrackerError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn list_handler<R>(
    State(tracker): State<Arc<ApplicationTracker<R>>>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let Some(user_id) = user_from_headers(&headers) else {
        return unauthorized();
    };

    match tracker.list_for_user(&user_id) {
        Ok(records) => {
            let views: Vec<ApplicationSummary> =
                records.iter().map(|record| record.summary()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn job_applications_handler<R>(
    State(tracker): State<Arc<ApplicationTracker<R>>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    if user_from_headers(&headers).is_none() {
        return unauthorized();
    }

    match tracker.list_for_job(&job_id) {
        Ok(records) => (StatusCode::OK, axum::Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn applied_handler<R>(
    State(tracker): State<Arc<ApplicationTracker<R>>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let Some(user_id) = user_from_headers(&headers) else {
        return unauthorized();
    };

    match tracker.has_applied(&user_id, &job_id) {
        Ok(applied) => {
            let payload = json!({
                "job_id": job_id,
                "applied": applied,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R>(
    State(tracker): State<Arc<ApplicationTracker<R>>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
    axum::Json(update): axum::Json<StatusUpdate>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    if user_from_headers(&headers).is_none() {
        return unauthorized();
    }

    match tracker.update_status(&ApplicationId(application_id), update) {
        Ok(record) => (StatusCode::OK, axum::Json(record.summary())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn notes_handler<R>(
    State(tracker): State<Arc<ApplicationTracker<R>>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
    axum::Json(update): axum::Json<NotesUpdate>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let Some(user_id) = user_from_headers(&headers) else {
        return unauthorized();
    };

    match tracker.update_notes(&user_id, &ApplicationId(application_id), update.notes) {
        Ok(record) => (StatusCode::OK, axum::Json(record.summary())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R>(
    State(tracker): State<Arc<ApplicationTracker<R>>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let Some(user_id) = user_from_headers(&headers) else {
        return unauthorized();
    };

    match tracker.delete(&user_id, &ApplicationId(application_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}
