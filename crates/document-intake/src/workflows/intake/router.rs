use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationStatus, ReferenceNumber};
use super::draft::ApplicationPayload;
use super::repository::{ApplicationRepository, StoredApplication};
use super::service::ApplicationService;
use crate::error::AppError;

/// Router builder exposing submission, lookup and status endpoints.
pub fn application_router<R>(service: Arc<ApplicationService<R>>) -> Router
where
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route("/api/applications", post(submit_handler::<R>))
        .route(
            "/api/applications/:reference_number",
            get(lookup_handler::<R>),
        )
        .route(
            "/api/applications/:reference_number/status",
            patch(status_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdateRequest {
    #[serde(default)]
    pub(crate) status: Option<String>,
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    body: Result<Json<ApplicationPayload>, JsonRejection>,
) -> Result<Response, AppError>
where
    R: ApplicationRepository + 'static,
{
    let Json(payload) = match body {
        Ok(body) => body,
        Err(rejection) => {
            let payload = json!({
                "error": "Validation failed",
                "details": [{ "path": [], "message": rejection.body_text() }],
            });
            return Ok((StatusCode::BAD_REQUEST, Json(payload)).into_response());
        }
    };

    let record = service.submit(&payload)?;
    let payload = json!({
        "message": "Application submitted successfully",
        "referenceNumber": record.reference_number,
        "status": record.status,
    });
    Ok((StatusCode::CREATED, Json(payload)).into_response())
}

pub(crate) async fn lookup_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Path(reference_number): Path<String>,
) -> Result<Json<StoredApplication>, AppError>
where
    R: ApplicationRepository + 'static,
{
    let record = service.get(&ReferenceNumber(reference_number))?;
    Ok(Json(record))
}

pub(crate) async fn status_handler<R>(
    State(service): State<Arc<ApplicationService<R>>>,
    Path(reference_number): Path<String>,
    body: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Response, AppError>
where
    R: ApplicationRepository + 'static,
{
    let status = body
        .ok()
        .and_then(|Json(request)| request.status)
        .and_then(|raw| raw.parse::<ApplicationStatus>().ok());
    let Some(status) = status else {
        let payload = json!({
            "error": "Invalid status",
            "validStatuses": ApplicationStatus::labels(),
        });
        return Ok((StatusCode::BAD_REQUEST, Json(payload)).into_response());
    };

    let record = service.update_status(&ReferenceNumber(reference_number), status)?;
    let payload = json!({
        "message": "Application status updated successfully",
        "application": record,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}
