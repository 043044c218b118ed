//! crates/practice_reminders_core/src/ports.rs
//!
//! Defines the service contracts (traits) the reminder core depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! core independent of how reminders are stored or how notifications are sent.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::{DomainError, Owner, Reminder};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<DomainError> for PortError {
    fn from(e: DomainError) -> Self {
        PortError::Invalid(e.to_string())
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn insert_reminder(&self, reminder: &Reminder) -> PortResult<()>;

    async fn get_reminder(&self, reminder_id: Uuid) -> PortResult<Reminder>;

    /// Overwrites an existing reminder. Missing ids are `NotFound`.
    async fn save_reminder(&self, reminder: &Reminder) -> PortResult<()>;

    async fn delete_reminder(&self, reminder_id: Uuid) -> PortResult<()>;

    async fn list_reminders_for_owner(&self, owner: &Owner) -> PortResult<Vec<Reminder>>;

    /// Active reminders across all owners whose `next_notification` is at or
    /// before `now`. Used by the dispatch scan.
    async fn list_due_reminders(&self, now: NaiveDateTime) -> PortResult<Vec<Reminder>>;

    /// Atomically records a sent notification on the stored reminder and
    /// reschedules it.
    ///
    /// Works on the current stored row, not a caller copy. Returns `Ok(None)`
    /// without changes when the reminder has been deactivated, and `NotFound`
    /// when it no longer exists.
    async fn mark_notified(
        &self,
        reminder_id: Uuid,
        now: NaiveDateTime,
    ) -> PortResult<Option<Reminder>>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Delivers a single reminder notification to its owner.
    async fn send_reminder(&self, reminder: &Reminder) -> PortResult<()>;
}
