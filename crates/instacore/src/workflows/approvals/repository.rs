use super::domain::{ApprovalId, ApprovalRecord};
use crate::workflows::storage::RepositoryError;

/// Storage abstraction for approval records.
pub trait ApprovalRepository: Send + Sync {
    fn insert(&self, record: ApprovalRecord) -> Result<ApprovalRecord, RepositoryError>;
    fn update(&self, record: ApprovalRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApprovalId) -> Result<Option<ApprovalRecord>, RepositoryError>;
    fn pending(&self, limit: usize) -> Result<Vec<ApprovalRecord>, RepositoryError>;
}
