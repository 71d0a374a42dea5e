use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use instacore::workflows::approvals::{approval_router, ApprovalRepository, ApprovalService};
use instacore::workflows::audit::AuditSink;
use instacore::workflows::enrollment::{
    enrollment_router, CapacityLedger, EnrollmentRepository, EnrollmentService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_workflow_routes<L, R, AR, S>(
    enrollments: Arc<EnrollmentService<L, R, S>>,
    approvals: Arc<ApprovalService<AR, S>>,
) -> axum::Router
where
    L: CapacityLedger + 'static,
    R: EnrollmentRepository + 'static,
    AR: ApprovalRepository + 'static,
    S: AuditSink + 'static,
{
    enrollment_router(enrollments)
        .merge(approval_router(approvals))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        seed_courses, InMemoryApprovalRepository, InMemoryAuditSink, InMemoryCourseLedger,
        InMemoryEnrollmentRepository,
    };
    use instacore::workflows::identity::UserId;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;

    fn app_state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body.get("status"), Some(&json!("ok")));
    }

    #[tokio::test]
    async fn readiness_flips_with_the_flag() {
        let response = readiness_endpoint(Extension(app_state(false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = readiness_endpoint(Extension(app_state(true)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn workflow_routes_compose_into_one_router() {
        let ledger = Arc::new(InMemoryCourseLedger::default());
        for course in seed_courses(UserId::new()) {
            ledger.register_course(course);
        }
        let audit = Arc::new(InMemoryAuditSink::default());
        let enrollments = Arc::new(EnrollmentService::new(
            ledger,
            Arc::new(InMemoryEnrollmentRepository::default()),
            audit.clone(),
        ));
        let approvals = Arc::new(ApprovalService::new(
            Arc::new(InMemoryApprovalRepository::default()),
            audit,
        ));

        let _router = with_workflow_routes(enrollments, approvals);
    }
}
