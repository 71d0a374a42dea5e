use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::audit::{AuditError, AuditEvent, AuditSink};
use crate::workflows::enrollment::capacity::{CapacityError, CapacityLedger};
use crate::workflows::enrollment::domain::{
    Course, CourseId, CourseSeats, Enrollment, EnrollmentId,
};
use crate::workflows::enrollment::repository::EnrollmentRepository;
use crate::workflows::enrollment::router::enrollment_router;
use crate::workflows::enrollment::service::EnrollmentService;
use crate::workflows::identity::UserId;
use crate::workflows::storage::RepositoryError;

pub(super) fn course_with_seats(total_seats: u32) -> Course {
    Course::new(
        "Advanced Databases",
        Some("CSE-412".to_string()),
        UserId::new(),
        total_seats,
    )
}

pub(super) fn build_service(
    course: Course,
) -> (
    Arc<EnrollmentService<MemoryCourseLedger, MemoryEnrollments, MemoryAudit>>,
    Arc<MemoryCourseLedger>,
    Arc<MemoryEnrollments>,
    Arc<MemoryAudit>,
) {
    let ledger = Arc::new(MemoryCourseLedger::with_course(course));
    let repository = Arc::new(MemoryEnrollments::default());
    let audit = Arc::new(MemoryAudit::default());
    let service = Arc::new(EnrollmentService::new(
        ledger.clone(),
        repository.clone(),
        audit.clone(),
    ));
    (service, ledger, repository, audit)
}

/// In-memory capacity ledger serializing the availability re-check and the
/// seat increment under one mutex guard.
#[derive(Default, Clone)]
pub(super) struct MemoryCourseLedger {
    courses: Arc<Mutex<HashMap<CourseId, Course>>>,
}

impl MemoryCourseLedger {
    pub(super) fn with_course(course: Course) -> Self {
        let ledger = Self::default();
        ledger.insert_course(course);
        ledger
    }

    pub(super) fn insert_course(&self, course: Course) {
        let mut guard = self.courses.lock().expect("course mutex poisoned");
        guard.insert(course.id, course);
    }

    pub(super) fn seats_filled(&self, id: &CourseId) -> u32 {
        let guard = self.courses.lock().expect("course mutex poisoned");
        guard.get(id).expect("course present").seats_filled
    }
}

impl CapacityLedger for MemoryCourseLedger {
    fn has_available_seat(&self, course: &CourseId) -> Result<bool, CapacityError> {
        let guard = self.courses.lock().expect("course mutex poisoned");
        let course = guard.get(course).ok_or(CapacityError::UnknownCourse)?;
        Ok(course.has_available_seat())
    }

    fn consume_seat(&self, course: &CourseId) -> Result<CourseSeats, CapacityError> {
        let mut guard = self.courses.lock().expect("course mutex poisoned");
        let course = guard.get_mut(course).ok_or(CapacityError::UnknownCourse)?;
        if !course.has_available_seat() {
            return Err(CapacityError::CapacityExceeded);
        }
        course.seats_filled += 1;
        Ok(CourseSeats {
            course_id: course.id,
            total_seats: course.total_seats,
            seats_filled: course.seats_filled,
        })
    }

    fn course(&self, course: &CourseId) -> Result<Course, CapacityError> {
        let guard = self.courses.lock().expect("course mutex poisoned");
        guard
            .get(course)
            .cloned()
            .ok_or(CapacityError::UnknownCourse)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryEnrollments {
    records: Arc<Mutex<HashMap<EnrollmentId, Enrollment>>>,
}

impl EnrollmentRepository for MemoryEnrollments {
    fn insert(&self, enrollment: Enrollment) -> Result<Enrollment, RepositoryError> {
        let mut guard = self.records.lock().expect("enrollment mutex poisoned");
        if guard.contains_key(&enrollment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(enrollment.id, enrollment.clone());
        Ok(enrollment)
    }

    fn update(&self, enrollment: Enrollment) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("enrollment mutex poisoned");
        guard.insert(enrollment.id, enrollment);
        Ok(())
    }

    fn fetch(&self, id: &EnrollmentId) -> Result<Option<Enrollment>, RepositoryError> {
        let guard = self.records.lock().expect("enrollment mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_course(&self, course: &CourseId) -> Result<Vec<Enrollment>, RepositoryError> {
        let guard = self.records.lock().expect("enrollment mutex poisoned");
        Ok(guard
            .values()
            .filter(|enrollment| enrollment.course == *course)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAudit {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAudit {
    pub(super) fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for MemoryAudit {
    fn publish(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .expect("audit mutex poisoned")
            .push(event);
        Ok(())
    }
}

/// Repository double that always reports the backing store offline.
pub(super) struct UnavailableEnrollments;

impl EnrollmentRepository for UnavailableEnrollments {
    fn insert(&self, _enrollment: Enrollment) -> Result<Enrollment, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _enrollment: Enrollment) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &EnrollmentId) -> Result<Option<Enrollment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_course(&self, _course: &CourseId) -> Result<Vec<Enrollment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn enrollment_router_with_service(
    service: Arc<EnrollmentService<MemoryCourseLedger, MemoryEnrollments, MemoryAudit>>,
) -> axum::Router {
    enrollment_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
