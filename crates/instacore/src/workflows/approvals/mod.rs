//! Generic approval records gating privileged institute actions.
//!
//! An approval is a decision wrapper, not the action itself: once a record is
//! approved, the requesting surface performs the underlying operation (for
//! enrollments, [`crate::workflows::enrollment::EnrollmentService::approve`]).

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    ApprovalAction, ApprovalId, ApprovalOutcome, ApprovalRecord, ApprovalStatus,
    ApprovalStatusView,
};
pub use repository::ApprovalRepository;
pub use router::{approval_router, DecideApprovalRequest, RecordApprovalRequest};
pub use service::{ApprovalService, ApprovalServiceError};
