use crate::cli::ServeArgs;
use crate::infra::{
    seed_courses, AppState, InMemoryApprovalRepository, InMemoryAuditSink, InMemoryCourseLedger,
    InMemoryEnrollmentRepository,
};
use crate::routes::with_workflow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use instacore::config::AppConfig;
use instacore::error::AppError;
use instacore::telemetry;
use instacore::workflows::approvals::ApprovalService;
use instacore::workflows::enrollment::EnrollmentService;
use instacore::workflows::identity::UserId;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let ledger = Arc::new(InMemoryCourseLedger::default());
    let registrar = UserId::new();
    for course in seed_courses(registrar) {
        ledger.register_course(course);
    }

    let audit = Arc::new(InMemoryAuditSink::default());
    let enrollment_service = Arc::new(EnrollmentService::new(
        ledger.clone(),
        Arc::new(InMemoryEnrollmentRepository::default()),
        audit.clone(),
    ));
    let approval_service = Arc::new(ApprovalService::new(
        Arc::new(InMemoryApprovalRepository::default()),
        audit,
    ));

    let app = with_workflow_routes(enrollment_service, approval_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        courses = ledger.courses().len(),
        "institute workflow service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
