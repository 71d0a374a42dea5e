use super::domain::{Course, CourseId, CourseSeats};

/// Seat bookkeeping for courses.
///
/// `consume_seat` is the only path that may mutate `seats_filled`. The
/// availability re-check and the increment must happen as one atomic step;
/// implementations serialize them per course (a mutex over the catalog, a
/// row-level lock, or equivalent) so concurrent approvals cannot overcommit.
pub trait CapacityLedger: Send + Sync {
    /// Read-only availability probe: `seats_filled < total_seats`.
    fn has_available_seat(&self, course: &CourseId) -> Result<bool, CapacityError>;

    /// Re-check availability and claim one seat, returning the updated
    /// counters. Fails with [`CapacityError::CapacityExceeded`] when the
    /// course is full at the moment of the increment.
    fn consume_seat(&self, course: &CourseId) -> Result<CourseSeats, CapacityError>;

    /// Fetch the course record for views and existence checks.
    fn course(&self, course: &CourseId) -> Result<Course, CapacityError>;
}

/// Error enumeration for capacity ledger failures.
#[derive(Debug, thiserror::Error)]
pub enum CapacityError {
    #[error("course has no remaining seats")]
    CapacityExceeded,
    #[error("course not found")]
    UnknownCourse,
    #[error("capacity ledger unavailable: {0}")]
    Unavailable(String),
}
