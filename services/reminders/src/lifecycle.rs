//! services/reminders/src/lifecycle.rs
//!
//! Reminder lifecycle operations on top of the `ReminderStore` port: create,
//! update, complete, delete, and the dispatch scan. Every operation takes an
//! explicit `now` so callers (and tests) control the clock.

use chrono::NaiveDateTime;
use practice_reminders_core::domain::{NewReminder, Owner, Reminder, ReminderUpdate};
use practice_reminders_core::ports::{NotificationService, PortError, PortResult, ReminderStore};
use practice_reminders_core::schedule::get_due;
use practice_reminders_core::stats::{summarize, ReminderStats};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ReminderService {
    store: Arc<dyn ReminderStore>,
}

impl ReminderService {
    pub fn new(store: Arc<dyn ReminderStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, new: NewReminder, now: NaiveDateTime) -> PortResult<Reminder> {
        let reminder = Reminder::create(new, now)?;
        self.store.insert_reminder(&reminder).await?;
        info!(
            "Created reminder {} for {} {}, next at {:?}",
            reminder.id,
            reminder.owner.kind(),
            reminder.owner.id(),
            reminder.next_notification
        );
        Ok(reminder)
    }

    /// Fetches a reminder, hiding reminders that belong to another owner.
    pub async fn get(&self, owner: &Owner, reminder_id: Uuid) -> PortResult<Reminder> {
        let reminder = self.store.get_reminder(reminder_id).await?;
        if &reminder.owner != owner {
            return Err(PortError::NotFound(format!(
                "Reminder {} not found",
                reminder_id
            )));
        }
        Ok(reminder)
    }

    /// The owner's reminders, soonest first; unscheduled ones go last.
    pub async fn list(&self, owner: &Owner) -> PortResult<Vec<Reminder>> {
        let mut reminders = self.store.list_reminders_for_owner(owner).await?;
        reminders.sort_by_key(|r| (r.next_notification.is_none(), r.next_notification));
        Ok(reminders)
    }

    pub async fn update(
        &self,
        owner: &Owner,
        reminder_id: Uuid,
        update: ReminderUpdate,
        now: NaiveDateTime,
    ) -> PortResult<Reminder> {
        let mut reminder = self.get(owner, reminder_id).await?;
        reminder.apply_update(update, now)?;
        self.store.save_reminder(&reminder).await?;
        debug!("Updated reminder {}", reminder_id);
        Ok(reminder)
    }

    pub async fn complete(
        &self,
        owner: &Owner,
        reminder_id: Uuid,
        now: NaiveDateTime,
    ) -> PortResult<Reminder> {
        let mut reminder = self.get(owner, reminder_id).await?;
        reminder.record_completion(now);
        self.store.save_reminder(&reminder).await?;
        info!(
            "Reminder {} completed, streak is now {}",
            reminder_id, reminder.streak
        );
        Ok(reminder)
    }

    pub async fn delete(&self, owner: &Owner, reminder_id: Uuid) -> PortResult<()> {
        self.get(owner, reminder_id).await?;
        self.store.delete_reminder(reminder_id).await?;
        info!("Deleted reminder {}", reminder_id);
        Ok(())
    }

    pub async fn due(&self, owner: &Owner, now: NaiveDateTime) -> PortResult<Vec<Reminder>> {
        let reminders = self.store.list_reminders_for_owner(owner).await?;
        Ok(get_due(&reminders, now).into_iter().cloned().collect())
    }

    pub async fn stats(&self, owner: &Owner, now: NaiveDateTime) -> PortResult<ReminderStats> {
        let reminders = self.store.list_reminders_for_owner(owner).await?;
        Ok(summarize(&reminders, now))
    }

    /// Sends every due reminder and reschedules it. Returns how many were sent.
    ///
    /// A reminder whose delivery fails keeps its schedule and is retried on the
    /// next scan. Reminders deactivated or deleted while their notification was
    /// in flight are left as the owner left them.
    pub async fn dispatch_due(
        &self,
        notifier: &dyn NotificationService,
        now: NaiveDateTime,
    ) -> PortResult<usize> {
        let due = self.store.list_due_reminders(now).await?;
        if due.is_empty() {
            debug!("No reminders due at {}", now);
            return Ok(0);
        }

        let mut sent = 0;
        for reminder in &due {
            if let Err(e) = notifier.send_reminder(reminder).await {
                warn!("Failed to send reminder {}: {:?}", reminder.id, e);
                continue;
            }
            match self.store.mark_notified(reminder.id, now).await {
                Ok(Some(_)) => sent += 1,
                Ok(None) => debug!("Reminder {} was deactivated during dispatch", reminder.id),
                Err(PortError::NotFound(_)) => {
                    debug!("Reminder {} was deleted during dispatch", reminder.id)
                }
                Err(e) => warn!("Failed to reschedule reminder {}: {:?}", reminder.id, e),
            }
        }
        info!("Dispatched {} reminder notification(s)", sent);
        Ok(sent)
    }
}
