use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflows::enrollment::domain::{CourseId, EnrollmentId};
use crate::workflows::identity::{JobId, UserId};
use crate::workflows::leave::domain::LeaveRequestId;

/// Identifier wrapper for approval records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalId(pub Uuid);

impl ApprovalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ApprovalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ApprovalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The action an approval gates, carrying the typed identifier it concerns.
///
/// The record never resolves or validates the referenced entity; the caller
/// resolves the target and invokes the matching domain operation after
/// observing an approved decision. For `Add*` actions the identifier refers
/// to the provisionally created entity awaiting sign-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ApprovalAction {
    AddCourse { course: CourseId },
    DeleteCourse { course: CourseId },
    AddUser { user: UserId },
    DeleteUser { user: UserId },
    EnrollStudent { enrollment: EnrollmentId },
    AddJob { job: JobId },
    DeleteJob { job: JobId },
    LeaveRequest { leave: LeaveRequestId },
    SalaryApproval { user: UserId },
}

impl ApprovalAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AddCourse { .. } => "add_course",
            Self::DeleteCourse { .. } => "delete_course",
            Self::AddUser { .. } => "add_user",
            Self::DeleteUser { .. } => "delete_user",
            Self::EnrollStudent { .. } => "enroll_student",
            Self::AddJob { .. } => "add_job",
            Self::DeleteJob { .. } => "delete_job",
            Self::LeaveRequest { .. } => "leave_request",
            Self::SalaryApproval { .. } => "salary_approval",
        }
    }

    /// The raw identifier the action concerns, for audit payloads.
    pub const fn target(self) -> Uuid {
        match self {
            Self::AddCourse { course } | Self::DeleteCourse { course } => course.0,
            Self::AddUser { user } | Self::DeleteUser { user } | Self::SalaryApproval { user } => {
                user.0
            }
            Self::EnrollStudent { enrollment } => enrollment.0,
            Self::AddJob { job } | Self::DeleteJob { job } => job.0,
            Self::LeaveRequest { leave } => leave.0,
        }
    }
}

/// Decision state of an approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Outcome supplied by the approver when deciding a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalOutcome {
    Approved,
    Rejected,
}

impl ApprovalOutcome {
    pub const fn status(self) -> ApprovalStatus {
        match self {
            Self::Approved => ApprovalStatus::Approved,
            Self::Rejected => ApprovalStatus::Rejected,
        }
    }
}

/// A generic pending/approved/rejected decision record spanning multiple
/// action types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub id: ApprovalId,
    pub action: ApprovalAction,
    pub requested_by: UserId,
    pub approved_by: Option<UserId>,
    pub status: ApprovalStatus,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl ApprovalRecord {
    pub fn new(action: ApprovalAction, requested_by: UserId, note: Option<String>) -> Self {
        Self {
            id: ApprovalId::new(),
            action,
            requested_by,
            approved_by: None,
            status: ApprovalStatus::Pending,
            requested_at: Utc::now(),
            decided_at: None,
            note,
        }
    }

    pub fn status_view(&self) -> ApprovalStatusView {
        ApprovalStatusView {
            approval_id: self.id,
            action: self.action.label(),
            status: self.status.label(),
            requested_at: self.requested_at,
            decided_at: self.decided_at,
            note: self.note.clone(),
        }
    }
}

/// Sanitized representation of an approval's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalStatusView {
    pub approval_id: ApprovalId,
    pub action: &'static str,
    pub status: &'static str,
    pub requested_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
