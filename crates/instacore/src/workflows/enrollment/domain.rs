use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflows::identity::UserId;

/// Identifier wrapper for courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseId(pub Uuid);

impl CourseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CourseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier wrapper for enrollments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnrollmentId(pub Uuid);

impl EnrollmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EnrollmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EnrollmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A course offering with its seat counters.
///
/// `seats_filled` is mutated only through the capacity ledger; everything
/// else is owned by the institute administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub code: Option<String>,
    pub teacher: UserId,
    pub total_seats: u32,
    pub seats_filled: u32,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn new(name: impl Into<String>, code: Option<String>, teacher: UserId, total_seats: u32) -> Self {
        Self {
            id: CourseId::new(),
            name: name.into(),
            code,
            teacher,
            total_seats,
            seats_filled: 0,
            created_at: Utc::now(),
        }
    }

    pub fn has_available_seat(&self) -> bool {
        self.seats_filled < self.total_seats
    }
}

/// Snapshot of a course's counters as returned by the capacity ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSeats {
    pub course_id: CourseId,
    pub total_seats: u32,
    pub seats_filled: u32,
}

/// Lifecycle status tracked for every enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Active,
    Completed,
    Rejected,
    Cancelled,
}

impl EnrollmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Completed, rejected, and cancelled admit no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }
}

/// A student's enrollment in a course. Records are never deleted; terminal
/// statuses keep them around for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student: UserId,
    pub course: CourseId,
    pub status: EnrollmentStatus,
    pub applied_at: DateTime<Utc>,
    pub enrolled_at: Option<DateTime<Utc>>,
}

impl Enrollment {
    pub fn new(student: UserId, course: CourseId) -> Self {
        Self {
            id: EnrollmentId::new(),
            student,
            course,
            status: EnrollmentStatus::Pending,
            applied_at: Utc::now(),
            enrolled_at: None,
        }
    }

    pub fn status_view(&self) -> EnrollmentStatusView {
        EnrollmentStatusView {
            enrollment_id: self.id,
            course_id: self.course,
            status: self.status.label(),
            applied_at: self.applied_at,
            enrolled_at: self.enrolled_at,
        }
    }
}

/// Sanitized representation of an enrollment's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentStatusView {
    pub enrollment_id: EnrollmentId,
    pub course_id: CourseId,
    pub status: &'static str,
    pub applied_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrolled_at: Option<DateTime<Utc>>,
}
