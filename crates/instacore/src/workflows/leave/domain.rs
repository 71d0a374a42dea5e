use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflows::identity::UserId;

/// Identifier wrapper for leave requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaveRequestId(pub Uuid);

impl LeaveRequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LeaveRequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LeaveRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a leave request. Approved, rejected, and cancelled
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A dated leave-of-absence request raised by any institute account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: LeaveRequestId,
    pub user: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub applied_at: DateTime<Utc>,
    pub actioned_at: Option<DateTime<Utc>>,
    pub actioned_by: Option<UserId>,
}

impl LeaveRequest {
    pub fn new(
        user: UserId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: LeaveRequestId::new(),
            user,
            start_date,
            end_date,
            reason: reason.into(),
            status: LeaveStatus::Pending,
            applied_at: Utc::now(),
            actioned_at: None,
            actioned_by: None,
        }
    }
}
