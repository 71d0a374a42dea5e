//! Audit trail boundary shared by the institute workflows.
//!
//! Every state-changing service operation publishes an [`AuditEvent`] so the
//! surrounding system can persist an edit history. Storage and delivery are
//! infrastructure concerns behind the [`AuditSink`] trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::UserId;

/// What happened to the audited entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
}

impl AuditAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

/// A single edit-history entry. `changes` carries the mutated fields as JSON
/// so sinks can store it without knowing every entity shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub entity: &'static str,
    pub object_id: Uuid,
    pub action: AuditAction,
    pub performed_by: Option<UserId>,
    pub recorded_at: DateTime<Utc>,
    pub changes: serde_json::Value,
}

impl AuditEvent {
    pub fn new(
        entity: &'static str,
        object_id: Uuid,
        action: AuditAction,
        performed_by: Option<UserId>,
        changes: serde_json::Value,
    ) -> Self {
        Self {
            entity,
            object_id,
            action,
            performed_by,
            recorded_at: Utc::now(),
            changes,
        }
    }
}

/// Outbound hook for audit persistence (database table, log shipper, ...).
pub trait AuditSink: Send + Sync {
    fn publish(&self, event: AuditEvent) -> Result<(), AuditError>;
}

/// Audit dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit transport unavailable: {0}")]
    Transport(String),
}
