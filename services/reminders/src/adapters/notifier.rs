//! services/reminders/src/adapters/notifier.rs
//!
//! A `NotificationService` that writes each reminder to the tracing output.
//! Stands in for push delivery, which lives outside this service.

use async_trait::async_trait;
use practice_reminders_core::format::format_schedule;
use practice_reminders_core::domain::Reminder;
use practice_reminders_core::ports::{NotificationService, PortResult};
use tracing::info;

#[derive(Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationService for LogNotifier {
    async fn send_reminder(&self, reminder: &Reminder) -> PortResult<()> {
        info!(
            reminder_id = %reminder.id,
            owner = %reminder.owner.id(),
            owner_kind = reminder.owner.kind(),
            reminder_type = %reminder.reminder_type,
            schedule = %format_schedule(reminder),
            "🔔 Practice reminder: {}",
            reminder.title
        );
        Ok(())
    }
}
