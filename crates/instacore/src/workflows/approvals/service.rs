use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use super::domain::{ApprovalAction, ApprovalId, ApprovalOutcome, ApprovalRecord, ApprovalStatus};
use super::repository::ApprovalRepository;
use crate::workflows::audit::{AuditAction, AuditError, AuditEvent, AuditSink};
use crate::workflows::identity::UserId;
use crate::workflows::storage::RepositoryError;

/// Service recording approval requests and their one-shot decisions.
///
/// This component only records decisions. Performing the approved action's
/// side effect (activating an enrollment, deleting a course, ...) is the
/// caller's responsibility after observing an approved record.
pub struct ApprovalService<R, S> {
    repository: Arc<R>,
    audit: Arc<S>,
}

impl<R, S> ApprovalService<R, S>
where
    R: ApprovalRepository + 'static,
    S: AuditSink + 'static,
{
    pub fn new(repository: Arc<R>, audit: Arc<S>) -> Self {
        Self { repository, audit }
    }

    /// Record a pending approval for the given action.
    pub fn record(
        &self,
        action: ApprovalAction,
        requested_by: UserId,
        note: Option<String>,
    ) -> Result<ApprovalRecord, ApprovalServiceError> {
        let record = ApprovalRecord::new(action, requested_by, note);
        let stored = self.repository.insert(record)?;

        self.audit.publish(AuditEvent::new(
            "approval",
            stored.id.0,
            AuditAction::Created,
            Some(requested_by),
            json!({
                "action": stored.action.label(),
                "target": stored.action.target(),
                "status": stored.status.label(),
            }),
        ))?;

        Ok(stored)
    }

    /// Decide a pending approval exactly once.
    ///
    /// A record that has already been decided is left untouched and the call
    /// fails with [`ApprovalServiceError::AlreadyDecided`].
    pub fn decide(
        &self,
        id: &ApprovalId,
        approver: UserId,
        outcome: ApprovalOutcome,
        note: Option<String>,
    ) -> Result<ApprovalRecord, ApprovalServiceError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if record.status != ApprovalStatus::Pending {
            return Err(ApprovalServiceError::AlreadyDecided(record.status));
        }

        record.status = outcome.status();
        record.approved_by = Some(approver);
        record.decided_at = Some(Utc::now());
        if note.is_some() {
            record.note = note;
        }
        self.repository.update(record.clone())?;

        self.audit.publish(AuditEvent::new(
            "approval",
            record.id.0,
            AuditAction::Updated,
            Some(approver),
            json!({ "status": record.status.label() }),
        ))?;

        Ok(record)
    }

    /// Fetch an approval record for API responses.
    pub fn get(&self, id: &ApprovalId) -> Result<ApprovalRecord, ApprovalServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// List pending approvals for reviewer dashboards.
    pub fn pending(&self, limit: usize) -> Result<Vec<ApprovalRecord>, ApprovalServiceError> {
        Ok(self.repository.pending(limit)?)
    }
}

/// Error raised by the approval service.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalServiceError {
    #[error("approval already decided as {}", .0.label())]
    AlreadyDecided(ApprovalStatus),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::workflows::audit::{AuditError, AuditEvent, AuditSink};
    use crate::workflows::enrollment::domain::EnrollmentId;

    #[derive(Default)]
    struct MemoryApprovals {
        records: Mutex<HashMap<ApprovalId, ApprovalRecord>>,
    }

    impl ApprovalRepository for MemoryApprovals {
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
            guard.insert(record.id, record);
            Ok(())
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

    #[derive(Default)]
    struct MemoryAudit {
        events: Mutex<Vec<AuditEvent>>,
    }

    impl MemoryAudit {
        fn events(&self) -> Vec<AuditEvent> {
            self.events.lock().expect("audit mutex poisoned").clone()
        }
    }

    impl AuditSink for MemoryAudit {
        fn publish(&self, event: AuditEvent) -> Result<(), AuditError> {
            self.events.lock().expect("audit mutex poisoned").push(event);
            Ok(())
        }
    }

    fn build_service() -> (
        ApprovalService<MemoryApprovals, MemoryAudit>,
        Arc<MemoryApprovals>,
        Arc<MemoryAudit>,
    ) {
        let repository = Arc::new(MemoryApprovals::default());
        let audit = Arc::new(MemoryAudit::default());
        let service = ApprovalService::new(repository.clone(), audit.clone());
        (service, repository, audit)
    }

    fn enroll_action() -> ApprovalAction {
        ApprovalAction::EnrollStudent {
            enrollment: EnrollmentId::new(),
        }
    }

    #[test]
    fn record_creates_pending_approval() {
        let (service, _, audit) = build_service();

        let record = service
            .record(enroll_action(), UserId::new(), Some("fall intake".to_string()))
            .expect("record succeeds");

        assert_eq!(record.status, ApprovalStatus::Pending);
        assert!(record.approved_by.is_none());
        assert!(record.decided_at.is_none());
        assert_eq!(record.note.as_deref(), Some("fall intake"));
        assert_eq!(audit.events().len(), 1);
    }

    #[test]
    fn decide_stamps_approver_and_timestamp_together() {
        let (service, repository, _) = build_service();
        let approver = UserId::new();

        let record = service
            .record(enroll_action(), UserId::new(), None)
            .expect("record succeeds");
        let decided = service
            .decide(&record.id, approver, ApprovalOutcome::Approved, None)
            .expect("decide succeeds");

        assert_eq!(decided.status, ApprovalStatus::Approved);
        assert_eq!(decided.approved_by, Some(approver));
        assert!(decided.decided_at.is_some());

        let stored = repository
            .fetch(&record.id)
            .expect("fetch succeeds")
            .expect("record present");
        assert_eq!(stored, decided);
    }

    #[test]
    fn second_decide_fails_and_leaves_status_unchanged() {
        let (service, repository, _) = build_service();

        let record = service
            .record(enroll_action(), UserId::new(), None)
            .expect("record succeeds");
        service
            .decide(&record.id, UserId::new(), ApprovalOutcome::Rejected, None)
            .expect("first decision succeeds");

        match service.decide(&record.id, UserId::new(), ApprovalOutcome::Approved, None) {
            Err(ApprovalServiceError::AlreadyDecided(ApprovalStatus::Rejected)) => {}
            other => panic!("expected already decided, got {other:?}"),
        }

        let stored = repository
            .fetch(&record.id)
            .expect("fetch succeeds")
            .expect("record present");
        assert_eq!(stored.status, ApprovalStatus::Rejected);
    }

    #[test]
    fn decide_propagates_not_found() {
        let (service, _, _) = build_service();

        match service.decide(
            &ApprovalId::new(),
            UserId::new(),
            ApprovalOutcome::Approved,
            None,
        ) {
            Err(ApprovalServiceError::Repository(RepositoryError::NotFound)) => {}
            other => panic!("expected not found error, got {other:?}"),
        }
    }

    #[test]
    fn pending_lists_only_undecided_records() {
        let (service, _, _) = build_service();

        let first = service
            .record(enroll_action(), UserId::new(), None)
            .expect("record succeeds");
        service
            .record(enroll_action(), UserId::new(), None)
            .expect("record succeeds");
        service
            .decide(&first.id, UserId::new(), ApprovalOutcome::Approved, None)
            .expect("decide succeeds");

        let pending = service.pending(10).expect("pending succeeds");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, ApprovalStatus::Pending);
    }
}
