use super::domain::{CourseId, Enrollment, EnrollmentId};
use crate::workflows::storage::RepositoryError;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait EnrollmentRepository: Send + Sync {
    fn insert(&self, enrollment: Enrollment) -> Result<Enrollment, RepositoryError>;
    fn update(&self, enrollment: Enrollment) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &EnrollmentId) -> Result<Option<Enrollment>, RepositoryError>;
    fn for_course(&self, course: &CourseId) -> Result<Vec<Enrollment>, RepositoryError>;
}
