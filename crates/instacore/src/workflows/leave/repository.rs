use super::domain::{LeaveRequest, LeaveRequestId};
use crate::workflows::identity::UserId;
use crate::workflows::storage::RepositoryError;

/// Storage abstraction for leave requests.
pub trait LeaveRepository: Send + Sync {
    fn insert(&self, request: LeaveRequest) -> Result<LeaveRequest, RepositoryError>;
    fn update(&self, request: LeaveRequest) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>, RepositoryError>;
    fn for_user(&self, user: &UserId) -> Result<Vec<LeaveRequest>, RepositoryError>;
}
