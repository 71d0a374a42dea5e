use crate::infra::{
    InMemoryApprovalRepository, InMemoryAuditSink, InMemoryCourseLedger,
    InMemoryEnrollmentRepository, InMemoryLeaveRepository,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use instacore::error::AppError;
use instacore::workflows::approvals::{ApprovalAction, ApprovalOutcome, ApprovalService};
use instacore::workflows::enrollment::{Course, EnrollmentService, EnrollmentServiceError};
use instacore::workflows::identity::UserId;
use instacore::workflows::leave::LeaveService;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Seat capacity of the demo course
    #[arg(long, default_value_t = 2)]
    pub(crate) seats: u32,
    /// Number of students applying for the demo course
    #[arg(long, default_value_t = 4)]
    pub(crate) applicants: u32,
    /// Leave start date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) leave_start: Option<NaiveDate>,
    /// Leave end date (YYYY-MM-DD). Defaults to leave_start + 2 days.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) leave_end: Option<NaiveDate>,
    /// Skip the leave-management portion of the demo.
    #[arg(long)]
    pub(crate) skip_leave: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        seats,
        applicants,
        leave_start,
        leave_end,
        skip_leave,
    } = args;

    let registrar = UserId::new();
    let ledger = Arc::new(InMemoryCourseLedger::default());
    let audit = Arc::new(InMemoryAuditSink::default());

    let course = Course::new(
        "Advanced Databases",
        Some("CSE-412".to_string()),
        registrar,
        seats,
    );
    let course_id = course.id;
    ledger.register_course(course);

    let enrollments = Arc::new(EnrollmentService::new(
        ledger.clone(),
        Arc::new(InMemoryEnrollmentRepository::default()),
        audit.clone(),
    ));
    let approvals = Arc::new(ApprovalService::new(
        Arc::new(InMemoryApprovalRepository::default()),
        audit.clone(),
    ));

    println!("InstaCore workflow demo");
    println!("Course CSE-412 with {seats} seats, {applicants} applicants");

    println!("\nEnrollment intake");
    let mut admitted = 0;
    for index in 1..=applicants {
        let student = UserId::new();
        let enrollment = match enrollments.submit(student, course_id) {
            Ok(enrollment) => enrollment,
            Err(err) => {
                println!("- applicant {index}: submission failed: {err}");
                continue;
            }
        };
        println!(
            "- applicant {index}: enrollment {} -> {}",
            enrollment.id,
            enrollment.status.label()
        );

        // The approval record gates the action; the enrollment service
        // performs it once the decision lands.
        let record = match approvals.record(
            ApprovalAction::EnrollStudent {
                enrollment: enrollment.id,
            },
            student,
            None,
        ) {
            Ok(record) => record,
            Err(err) => {
                println!("  approval record failed: {err}");
                continue;
            }
        };
        if let Err(err) = approvals.decide(&record.id, registrar, ApprovalOutcome::Approved, None) {
            println!("  approval decision failed: {err}");
            continue;
        }

        match enrollments.approve(&enrollment.id, registrar) {
            Ok(active) => {
                admitted += 1;
                println!(
                    "  seat claimed -> {} (enrolled at {})",
                    active.status.label(),
                    active
                        .enrolled_at
                        .map(|at| at.to_rfc3339())
                        .unwrap_or_default()
                );
            }
            Err(EnrollmentServiceError::NoSeatsAvailable(_)) => {
                println!("  course full -> rejecting enrollment");
                match enrollments.reject(&enrollment.id, registrar) {
                    Ok(rejected) => println!("  final status: {}", rejected.status.label()),
                    Err(err) => println!("  rejection failed: {err}"),
                }
            }
            Err(err) => return Err(err.into()),
        }
    }

    let filled = ledger
        .courses()
        .into_iter()
        .find(|course| course.id == course_id)
        .map(|course| course.seats_filled)
        .unwrap_or_default();
    println!("\nSeats filled: {filled}/{seats} ({admitted} admitted)");

    let sample = enrollments
        .submit(UserId::new(), course_id)
        .and_then(|enrollment| {
            if filled < seats {
                enrollments.approve(&enrollment.id, registrar)
            } else {
                Ok(enrollment)
            }
        })?;
    match serde_json::to_string_pretty(&sample.status_view()) {
        Ok(json) => println!("Sample status payload:\n{json}"),
        Err(err) => println!("Sample status payload unavailable: {err}"),
    }

    if !skip_leave {
        println!("\nLeave management");
        let leave_service = LeaveService::new(
            Arc::new(InMemoryLeaveRepository::default()),
            audit.clone(),
        );
        let start = leave_start.unwrap_or_else(|| Local::now().date_naive());
        let end = leave_end.unwrap_or_else(|| start + chrono::Duration::days(2));

        match leave_service.submit(UserId::new(), start, end, "faculty workshop") {
            Ok(request) => {
                println!("- leave {} -> {}", request.id, request.status.label());
                match leave_service.approve(&request.id, registrar) {
                    Ok(approved) => {
                        println!("  actioned -> {}", approved.status.label());
                    }
                    Err(err) => println!("  approval failed: {err}"),
                }
            }
            Err(err) => println!("- leave submission rejected: {err}"),
        }
    }

    println!("\nAudit trail");
    for event in audit.events() {
        println!(
            "- {} {} {} by {}",
            event.recorded_at.to_rfc3339(),
            event.entity,
            event.action.label(),
            event
                .performed_by
                .map(|user| user.to_string())
                .unwrap_or_else(|| "system".to_string())
        );
    }

    Ok(())
}
