//! Enrollment intake, seat-capacity accounting, and lifecycle transitions.
//!
//! A student submits a pending enrollment; an approver activates it through
//! the service, which claims a seat from the capacity ledger before the
//! status transition is persisted. Course seat counters are mutated only by
//! the ledger so concurrent approvals cannot overcommit a course.

pub mod capacity;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use capacity::{CapacityError, CapacityLedger};
pub use domain::{
    Course, CourseId, CourseSeats, Enrollment, EnrollmentId, EnrollmentStatus,
    EnrollmentStatusView,
};
pub use repository::EnrollmentRepository;
pub use router::{enrollment_router, DecisionRequest, EnrollmentRequest};
pub use service::{EnrollmentService, EnrollmentServiceError};
