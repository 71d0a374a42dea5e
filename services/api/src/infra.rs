use chrono::NaiveDate;
use instacore::workflows::approvals::{
    ApprovalId, ApprovalRecord, ApprovalRepository, ApprovalStatus,
};
use instacore::workflows::audit::{AuditError, AuditEvent, AuditSink};
use instacore::workflows::enrollment::{
    CapacityError, CapacityLedger, Course, CourseId, CourseSeats, Enrollment, EnrollmentId,
    EnrollmentRepository,
};
use instacore::workflows::identity::UserId;
use instacore::workflows::leave::{LeaveRepository, LeaveRequest, LeaveRequestId};
use instacore::workflows::storage::RepositoryError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory course catalog doubling as the capacity ledger. The availability
/// re-check and the seat increment share one lock acquisition.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCourseLedger {
    courses: Arc<Mutex<HashMap<CourseId, Course>>>,
}

impl InMemoryCourseLedger {
    pub(crate) fn register_course(&self, course: Course) {
        let mut guard = self.courses.lock().expect("course mutex poisoned");
        guard.insert(course.id, course);
    }

    pub(crate) fn courses(&self) -> Vec<Course> {
        let guard = self.courses.lock().expect("course mutex poisoned");
        let mut courses: Vec<Course> = guard.values().cloned().collect();
        courses.sort_by(|a, b| a.name.cmp(&b.name));
        courses
    }
}

impl CapacityLedger for InMemoryCourseLedger {
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
pub(crate) struct InMemoryEnrollmentRepository {
    records: Arc<Mutex<HashMap<EnrollmentId, Enrollment>>>,
}

impl EnrollmentRepository for InMemoryEnrollmentRepository {
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
        if guard.contains_key(&enrollment.id) {
            guard.insert(enrollment.id, enrollment);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
pub(crate) struct InMemoryApprovalRepository {
    records: Arc<Mutex<HashMap<ApprovalId, ApprovalRecord>>>,
}

impl ApprovalRepository for InMemoryApprovalRepository {
    fn insert(&self, record: ApprovalRecord) -> Result<ApprovalRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("approval mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, record: ApprovalRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("approval mutex poisoned");
        if guard.contains_key(&record.id) {
            guard.insert(record.id, record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApprovalId) -> Result<Option<ApprovalRecord>, RepositoryError> {
        let guard = self.records.lock().expect("approval mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn pending(&self, limit: usize) -> Result<Vec<ApprovalRecord>, RepositoryError> {
        let guard = self.records.lock().expect("approval mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == ApprovalStatus::Pending)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLeaveRepository {
    records: Arc<Mutex<HashMap<LeaveRequestId, LeaveRequest>>>,
}

impl LeaveRepository for InMemoryLeaveRepository {
    fn insert(&self, request: LeaveRequest) -> Result<LeaveRequest, RepositoryError> {
        let mut guard = self.records.lock().expect("leave mutex poisoned");
        if guard.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(request.id, request.clone());
        Ok(request)
    }

    fn update(&self, request: LeaveRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("leave mutex poisoned");
        guard.insert(request.id, request);
        Ok(())
    }

    fn fetch(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>, RepositoryError> {
        let guard = self.records.lock().expect("leave mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<LeaveRequest>, RepositoryError> {
        let guard = self.records.lock().expect("leave mutex poisoned");
        Ok(guard
            .values()
            .filter(|request| request.user == *user)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditSink {
    pub(crate) fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn publish(&self, event: AuditEvent) -> Result<(), AuditError> {
        let mut guard = self.events.lock().expect("audit mutex poisoned");
        guard.push(event);
        Ok(())
    }
}

/// Seed catalog used by `serve` and the CLI demo until a real course admin
/// surface lands.
pub(crate) fn seed_courses(registrar: UserId) -> Vec<Course> {
    vec![
        Course::new("Intro to Programming", Some("CSE-101".to_string()), registrar, 40),
        Course::new("Data Structures", Some("CSE-205".to_string()), registrar, 35),
        Course::new("Advanced Databases", Some("CSE-412".to_string()), registrar, 25),
    ]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
