use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::capacity::CapacityLedger;
use super::domain::{CourseId, EnrollmentId};
use super::repository::EnrollmentRepository;
use super::service::{EnrollmentService, EnrollmentServiceError};
use crate::workflows::audit::AuditSink;
use crate::workflows::identity::UserId;
use crate::workflows::storage::RepositoryError;

/// Payload for creating a pending enrollment.
#[derive(Debug, Deserialize)]
pub struct EnrollmentRequest {
    pub student: UserId,
    pub course: CourseId,
}

/// Payload identifying the acting approver for approve/reject.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub approver: UserId,
}

/// Router builder exposing HTTP endpoints for the enrollment workflow.
pub fn enrollment_router<L, R, S>(service: Arc<EnrollmentService<L, R, S>>) -> Router
where
    L: CapacityLedger + 'static,
    R: EnrollmentRepository + 'static,
    S: AuditSink + 'static,
{
    Router::new()
        .route("/api/v1/enrollments", post(submit_handler::<L, R, S>))
        .route(
            "/api/v1/enrollments/:enrollment_id",
            get(status_handler::<L, R, S>),
        )
        .route(
            "/api/v1/enrollments/:enrollment_id/approve",
            post(approve_handler::<L, R, S>),
        )
        .route(
            "/api/v1/enrollments/:enrollment_id/reject",
            post(reject_handler::<L, R, S>),
        )
        .route(
            "/api/v1/enrollments/:enrollment_id/cancel",
            post(cancel_handler::<L, R, S>),
        )
        .route(
            "/api/v1/enrollments/:enrollment_id/complete",
            post(complete_handler::<L, R, S>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<L, R, S>(
    State(service): State<Arc<EnrollmentService<L, R, S>>>,
    axum::Json(request): axum::Json<EnrollmentRequest>,
) -> Response
where
    L: CapacityLedger + 'static,
    R: EnrollmentRepository + 'static,
    S: AuditSink + 'static,
{
    match service.submit(request.student, request.course) {
        Ok(enrollment) => {
            let view = enrollment.status_view();
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(error @ EnrollmentServiceError::UnknownCourse(_)) => {
            error_response(StatusCode::NOT_FOUND, &error)
        }
        Err(EnrollmentServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({ "error": "enrollment already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &other),
    }
}

pub(crate) async fn status_handler<L, R, S>(
    State(service): State<Arc<EnrollmentService<L, R, S>>>,
    Path(enrollment_id): Path<Uuid>,
) -> Response
where
    L: CapacityLedger + 'static,
    R: EnrollmentRepository + 'static,
    S: AuditSink + 'static,
{
    let id = EnrollmentId(enrollment_id);
    match service.get(&id) {
        Ok(enrollment) => {
            let view = enrollment.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => decision_error_response(error),
    }
}

pub(crate) async fn approve_handler<L, R, S>(
    State(service): State<Arc<EnrollmentService<L, R, S>>>,
    Path(enrollment_id): Path<Uuid>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    L: CapacityLedger + 'static,
    R: EnrollmentRepository + 'static,
    S: AuditSink + 'static,
{
    let id = EnrollmentId(enrollment_id);
    match service.approve(&id, request.approver) {
        Ok(enrollment) => {
            let view = enrollment.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => decision_error_response(error),
    }
}

pub(crate) async fn reject_handler<L, R, S>(
    State(service): State<Arc<EnrollmentService<L, R, S>>>,
    Path(enrollment_id): Path<Uuid>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    L: CapacityLedger + 'static,
    R: EnrollmentRepository + 'static,
    S: AuditSink + 'static,
{
    let id = EnrollmentId(enrollment_id);
    match service.reject(&id, request.approver) {
        Ok(enrollment) => {
            let view = enrollment.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => decision_error_response(error),
    }
}

pub(crate) async fn cancel_handler<L, R, S>(
    State(service): State<Arc<EnrollmentService<L, R, S>>>,
    Path(enrollment_id): Path<Uuid>,
) -> Response
where
    L: CapacityLedger + 'static,
    R: EnrollmentRepository + 'static,
    S: AuditSink + 'static,
{
    let id = EnrollmentId(enrollment_id);
    match service.cancel(&id) {
        Ok(enrollment) => {
            let view = enrollment.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => decision_error_response(error),
    }
}

pub(crate) async fn complete_handler<L, R, S>(
    State(service): State<Arc<EnrollmentService<L, R, S>>>,
    Path(enrollment_id): Path<Uuid>,
) -> Response
where
    L: CapacityLedger + 'static,
    R: EnrollmentRepository + 'static,
    S: AuditSink + 'static,
{
    let id = EnrollmentId(enrollment_id);
    match service.complete(&id) {
        Ok(enrollment) => {
            let view = enrollment.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => decision_error_response(error),
    }
}

fn decision_error_response(error: EnrollmentServiceError) -> Response {
    match error {
        EnrollmentServiceError::Repository(RepositoryError::NotFound) => {
            error_response(StatusCode::NOT_FOUND, &error)
        }
        EnrollmentServiceError::NoSeatsAvailable(_) => {
            error_response(StatusCode::CONFLICT, &error)
        }
        EnrollmentServiceError::InvalidTransition { .. } => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, &error)
        }
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, &other),
    }
}

fn error_response(status: StatusCode, error: &EnrollmentServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
