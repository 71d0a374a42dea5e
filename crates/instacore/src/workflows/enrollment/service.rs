use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use super::capacity::{CapacityError, CapacityLedger};
use super::domain::{CourseId, Enrollment, EnrollmentId, EnrollmentStatus};
use super::repository::EnrollmentRepository;
use crate::workflows::audit::{AuditAction, AuditError, AuditEvent, AuditSink};
use crate::workflows::identity::UserId;
use crate::workflows::storage::RepositoryError;

/// Service composing the capacity ledger, enrollment repository, and audit
/// sink into the enrollment state machine.
pub struct EnrollmentService<L, R, S> {
    ledger: Arc<L>,
    repository: Arc<R>,
    audit: Arc<S>,
}

impl<L, R, S> EnrollmentService<L, R, S>
where
    L: CapacityLedger + 'static,
    R: EnrollmentRepository + 'static,
    S: AuditSink + 'static,
{
    pub fn new(ledger: Arc<L>, repository: Arc<R>, audit: Arc<S>) -> Self {
        Self {
            ledger,
            repository,
            audit,
        }
    }

    /// Submit a new pending enrollment for the given student and course.
    pub fn submit(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<Enrollment, EnrollmentServiceError> {
        match self.ledger.course(&course) {
            Ok(_) => {}
            Err(CapacityError::UnknownCourse) => {
                return Err(EnrollmentServiceError::UnknownCourse(course));
            }
            Err(other) => return Err(other.into()),
        }

        let enrollment = Enrollment::new(student, course);
        let stored = self.repository.insert(enrollment)?;

        self.audit.publish(AuditEvent::new(
            "enrollment",
            stored.id.0,
            AuditAction::Created,
            Some(student),
            json!({ "status": stored.status.label(), "course": stored.course }),
        ))?;

        Ok(stored)
    }

    /// Approve a pending enrollment: claim a seat, then activate.
    ///
    /// Approving an enrollment that is already active is a no-op: the stored
    /// record is returned unchanged and no seat is consumed. The seat claim
    /// and the status write happen in that order, so a full course leaves the
    /// enrollment untouched.
    pub fn approve(
        &self,
        id: &EnrollmentId,
        approver: UserId,
    ) -> Result<Enrollment, EnrollmentServiceError> {
        let mut enrollment = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if enrollment.status == EnrollmentStatus::Active {
            return Ok(enrollment);
        }
        if enrollment.status.is_terminal() {
            return Err(EnrollmentServiceError::InvalidTransition {
                from: enrollment.status,
                to: EnrollmentStatus::Active,
            });
        }

        let seats = match self.ledger.consume_seat(&enrollment.course) {
            Ok(seats) => seats,
            Err(CapacityError::CapacityExceeded) => {
                return Err(EnrollmentServiceError::NoSeatsAvailable(enrollment.course));
            }
            Err(other) => return Err(other.into()),
        };

        // Status and activation timestamp are persisted as one unit.
        enrollment.status = EnrollmentStatus::Active;
        enrollment.enrolled_at = Some(Utc::now());
        self.repository.update(enrollment.clone())?;

        self.audit.publish(AuditEvent::new(
            "enrollment",
            enrollment.id.0,
            AuditAction::Updated,
            Some(approver),
            json!({
                "status": enrollment.status.label(),
                "seats_filled": seats.seats_filled,
            }),
        ))?;

        Ok(enrollment)
    }

    /// Reject an enrollment. No capacity interaction.
    pub fn reject(
        &self,
        id: &EnrollmentId,
        approver: UserId,
    ) -> Result<Enrollment, EnrollmentServiceError> {
        self.transition(id, EnrollmentStatus::Rejected, Some(approver))
    }

    /// Cancel an enrollment (student- or admin-initiated withdrawal).
    pub fn cancel(&self, id: &EnrollmentId) -> Result<Enrollment, EnrollmentServiceError> {
        self.transition(id, EnrollmentStatus::Cancelled, None)
    }

    /// Mark an active enrollment as completed.
    pub fn complete(&self, id: &EnrollmentId) -> Result<Enrollment, EnrollmentServiceError> {
        let enrollment = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if enrollment.status != EnrollmentStatus::Active {
            return Err(EnrollmentServiceError::InvalidTransition {
                from: enrollment.status,
                to: EnrollmentStatus::Completed,
            });
        }

        self.apply_status(enrollment, EnrollmentStatus::Completed, None)
    }

    /// Fetch an enrollment for API responses.
    pub fn get(&self, id: &EnrollmentId) -> Result<Enrollment, EnrollmentServiceError> {
        let enrollment = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(enrollment)
    }

    fn transition(
        &self,
        id: &EnrollmentId,
        to: EnrollmentStatus,
        performed_by: Option<UserId>,
    ) -> Result<Enrollment, EnrollmentServiceError> {
        let enrollment = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if enrollment.status.is_terminal() {
            return Err(EnrollmentServiceError::InvalidTransition {
                from: enrollment.status,
                to,
            });
        }

        self.apply_status(enrollment, to, performed_by)
    }

    fn apply_status(
        &self,
        mut enrollment: Enrollment,
        to: EnrollmentStatus,
        performed_by: Option<UserId>,
    ) -> Result<Enrollment, EnrollmentServiceError> {
        enrollment.status = to;
        self.repository.update(enrollment.clone())?;

        self.audit.publish(AuditEvent::new(
            "enrollment",
            enrollment.id.0,
            AuditAction::Updated,
            performed_by,
            json!({ "status": enrollment.status.label() }),
        ))?;

        Ok(enrollment)
    }
}

/// Error raised by the enrollment service.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentServiceError {
    #[error("no seats available for course {0}")]
    NoSeatsAvailable(CourseId),
    #[error("unknown course {0}")]
    UnknownCourse(CourseId),
    #[error("cannot transition enrollment from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: EnrollmentStatus,
        to: EnrollmentStatus,
    },
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}
