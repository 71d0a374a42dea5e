use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::json;

use super::domain::{LeaveRequest, LeaveRequestId, LeaveStatus};
use super::repository::LeaveRepository;
use crate::workflows::audit::{AuditAction, AuditError, AuditEvent, AuditSink};
use crate::workflows::identity::UserId;
use crate::workflows::storage::RepositoryError;

/// Service driving the leave request lifecycle.
pub struct LeaveService<R, S> {
    repository: Arc<R>,
    audit: Arc<S>,
}

impl<R, S> LeaveService<R, S>
where
    R: LeaveRepository + 'static,
    S: AuditSink + 'static,
{
    pub fn new(repository: Arc<R>, audit: Arc<S>) -> Self {
        Self { repository, audit }
    }

    /// Submit a pending leave request covering the given date range.
    pub fn submit(
        &self,
        user: UserId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: impl Into<String>,
    ) -> Result<LeaveRequest, LeaveServiceError> {
        if end_date < start_date {
            return Err(LeaveServiceError::InvalidRange {
                start_date,
                end_date,
            });
        }

        let request = LeaveRequest::new(user, start_date, end_date, reason);
        let stored = self.repository.insert(request)?;

        self.audit.publish(AuditEvent::new(
            "leave_request",
            stored.id.0,
            AuditAction::Created,
            Some(user),
            json!({
                "status": stored.status.label(),
                "start_date": stored.start_date,
                "end_date": stored.end_date,
            }),
        ))?;

        Ok(stored)
    }

    /// Approve a pending leave request.
    pub fn approve(
        &self,
        id: &LeaveRequestId,
        approver: UserId,
    ) -> Result<LeaveRequest, LeaveServiceError> {
        self.action(id, LeaveStatus::Approved, Some(approver))
    }

    /// Reject a pending leave request.
    pub fn reject(
        &self,
        id: &LeaveRequestId,
        approver: UserId,
    ) -> Result<LeaveRequest, LeaveServiceError> {
        self.action(id, LeaveStatus::Rejected, Some(approver))
    }

    /// Withdraw a pending leave request.
    pub fn cancel(&self, id: &LeaveRequestId) -> Result<LeaveRequest, LeaveServiceError> {
        self.action(id, LeaveStatus::Cancelled, None)
    }

    /// Fetch a leave request.
    pub fn get(&self, id: &LeaveRequestId) -> Result<LeaveRequest, LeaveServiceError> {
        let request = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(request)
    }

    fn action(
        &self,
        id: &LeaveRequestId,
        to: LeaveStatus,
        actioned_by: Option<UserId>,
    ) -> Result<LeaveRequest, LeaveServiceError> {
        let mut request = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if request.status.is_terminal() {
            return Err(LeaveServiceError::AlreadyActioned(request.status));
        }

        // Status, timestamp, and actor land in storage as one write.
        request.status = to;
        request.actioned_at = Some(Utc::now());
        request.actioned_by = actioned_by;
        self.repository.update(request.clone())?;

        self.audit.publish(AuditEvent::new(
            "leave_request",
            request.id.0,
            AuditAction::Updated,
            actioned_by,
            json!({ "status": request.status.label() }),
        ))?;

        Ok(request)
    }
}

/// Error raised by the leave service.
#[derive(Debug, thiserror::Error)]
pub enum LeaveServiceError {
    #[error("leave range is invalid: {start_date} to {end_date}")]
    InvalidRange {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    #[error("leave request already actioned as {}", .0.label())]
    AlreadyActioned(LeaveStatus),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}
