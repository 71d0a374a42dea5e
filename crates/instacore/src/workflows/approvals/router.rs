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

use super::domain::{ApprovalAction, ApprovalId, ApprovalOutcome};
use super::repository::ApprovalRepository;
use super::service::{ApprovalService, ApprovalServiceError};
use crate::workflows::audit::AuditSink;
use crate::workflows::identity::UserId;
use crate::workflows::storage::RepositoryError;

/// Payload for recording a pending approval. The action tag and its target
/// identifier sit at the top level of the JSON body.
#[derive(Debug, Deserialize)]
pub struct RecordApprovalRequest {
    #[serde(flatten)]
    pub action: ApprovalAction,
    pub requested_by: UserId,
    #[serde(default)]
    pub note: Option<String>,
}

/// Payload for deciding a pending approval.
#[derive(Debug, Deserialize)]
pub struct DecideApprovalRequest {
    pub approver: UserId,
    pub outcome: ApprovalOutcome,
    #[serde(default)]
    pub note: Option<String>,
}

/// Router builder exposing HTTP endpoints for the approval workflow.
pub fn approval_router<R, S>(service: Arc<ApprovalService<R, S>>) -> Router
where
    R: ApprovalRepository + 'static,
    S: AuditSink + 'static,
{
    Router::new()
        .route("/api/v1/approvals", post(record_handler::<R, S>))
        .route(
            "/api/v1/approvals/:approval_id",
            get(status_handler::<R, S>),
        )
        .route(
            "/api/v1/approvals/:approval_id/decision",
            post(decide_handler::<R, S>),
        )
        .with_state(service)
}

pub(crate) async fn record_handler<R, S>(
    State(service): State<Arc<ApprovalService<R, S>>>,
    axum::Json(request): axum::Json<RecordApprovalRequest>,
) -> Response
where
    R: ApprovalRepository + 'static,
    S: AuditSink + 'static,
{
    match service.record(request.action, request.requested_by, request.note) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(error) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &error),
    }
}

pub(crate) async fn status_handler<R, S>(
    State(service): State<Arc<ApprovalService<R, S>>>,
    Path(approval_id): Path<Uuid>,
) -> Response
where
    R: ApprovalRepository + 'static,
    S: AuditSink + 'static,
{
    let id = ApprovalId(approval_id);
    match service.get(&id) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error @ ApprovalServiceError::Repository(RepositoryError::NotFound)) => {
            error_response(StatusCode::NOT_FOUND, &error)
        }
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &other),
    }
}

pub(crate) async fn decide_handler<R, S>(
    State(service): State<Arc<ApprovalService<R, S>>>,
    Path(approval_id): Path<Uuid>,
    axum::Json(request): axum::Json<DecideApprovalRequest>,
) -> Response
where
    R: ApprovalRepository + 'static,
    S: AuditSink + 'static,
{
    let id = ApprovalId(approval_id);
    match service.decide(&id, request.approver, request.outcome, request.note) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error @ ApprovalServiceError::AlreadyDecided(_)) => {
            error_response(StatusCode::CONFLICT, &error)
        }
        Err(error @ ApprovalServiceError::Repository(RepositoryError::NotFound)) => {
            error_response(StatusCode::NOT_FOUND, &error)
        }
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &other),
    }
}

fn error_response(status: StatusCode, error: &ApprovalServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
