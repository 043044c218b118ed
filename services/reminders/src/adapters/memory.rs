//! services/reminders/src/adapters/memory.rs
//!
//! In-process implementation of the `ReminderStore` port. Nothing survives a
//! restart; this is the default when no database is configured.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use practice_reminders_core::domain::{Owner, Reminder};
use practice_reminders_core::ports::{PortError, PortResult, ReminderStore};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    reminders: RwLock<HashMap<Uuid, Reminder>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(reminder_id: Uuid) -> PortError {
    PortError::NotFound(format!("Reminder {} not found", reminder_id))
}

#[async_trait]
impl ReminderStore for MemoryStore {
    async fn insert_reminder(&self, reminder: &Reminder) -> PortResult<()> {
        let mut reminders = self.reminders.write().await;
        if reminders.contains_key(&reminder.id) {
            return Err(PortError::Unexpected(format!(
                "Reminder {} already exists",
                reminder.id
            )));
        }
        reminders.insert(reminder.id, reminder.clone());
        Ok(())
    }

    async fn get_reminder(&self, reminder_id: Uuid) -> PortResult<Reminder> {
        self.reminders
            .read()
            .await
            .get(&reminder_id)
            .cloned()
            .ok_or_else(|| not_found(reminder_id))
    }

    async fn save_reminder(&self, reminder: &Reminder) -> PortResult<()> {
        let mut reminders = self.reminders.write().await;
        match reminders.get_mut(&reminder.id) {
            Some(existing) => {
                *existing = reminder.clone();
                Ok(())
            }
            None => Err(not_found(reminder.id)),
        }
    }

    async fn delete_reminder(&self, reminder_id: Uuid) -> PortResult<()> {
        self.reminders
            .write()
            .await
            .remove(&reminder_id)
            .map(|_| ())
            .ok_or_else(|| not_found(reminder_id))
    }

    async fn list_reminders_for_owner(&self, owner: &Owner) -> PortResult<Vec<Reminder>> {
        let reminders = self.reminders.read().await;
        Ok(reminders
            .values()
            .filter(|r| &r.owner == owner)
            .cloned()
            .collect())
    }

    async fn list_due_reminders(&self, now: NaiveDateTime) -> PortResult<Vec<Reminder>> {
        let reminders = self.reminders.read().await;
        Ok(reminders.values().filter(|r| r.is_due(now)).cloned().collect())
    }

    async fn mark_notified(
        &self,
        reminder_id: Uuid,
        now: NaiveDateTime,
    ) -> PortResult<Option<Reminder>> {
        let mut reminders = self.reminders.write().await;
        let reminder = reminders
            .get_mut(&reminder_id)
            .ok_or_else(|| not_found(reminder_id))?;
        if !reminder.active {
            return Ok(None);
        }
        reminder.record_notification(now);
        Ok(Some(reminder.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use practice_reminders_core::domain::{Frequency, NewReminder, ReminderType};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn reminder(owner: Owner) -> Reminder {
        let now = at(1, 9);
        let input = NewReminder {
            owner,
            title: "Gratitude list".to_string(),
            description: String::new(),
            reminder_type: ReminderType::Reflection,
            frequency: Frequency::Daily,
            time_preferences: None,
            days_of_week: None,
            linked_content_id: None,
        };
        Reminder::create(input, now).unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_and_delete() {
        let store = MemoryStore::new();
        let r = reminder(Owner::User("u1".to_string()));
        store.insert_reminder(&r).await.unwrap();
        assert_eq!(store.get_reminder(r.id).await.unwrap(), r);
        assert!(store.insert_reminder(&r).await.is_err());

        store.delete_reminder(r.id).await.unwrap();
        assert!(matches!(
            store.get_reminder(r.id).await,
            Err(PortError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_reminder(r.id).await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_requires_existing_reminder() {
        let store = MemoryStore::new();
        let mut r = reminder(Owner::User("u1".to_string()));
        assert!(matches!(
            store.save_reminder(&r).await,
            Err(PortError::NotFound(_))
        ));

        store.insert_reminder(&r).await.unwrap();
        r.streak = 5;
        store.save_reminder(&r).await.unwrap();
        assert_eq!(store.get_reminder(r.id).await.unwrap().streak, 5);
    }

    #[tokio::test]
    async fn test_listing_filters_by_owner_and_due() {
        let store = MemoryStore::new();
        let mine = reminder(Owner::Session("s1".to_string()));
        let mut paused = reminder(Owner::Session("s1".to_string()));
        paused.active = false;
        let theirs = reminder(Owner::User("s1".to_string()));
        for r in [&mine, &paused, &theirs] {
            store.insert_reminder(r).await.unwrap();
        }

        let owned = store
            .list_reminders_for_owner(&Owner::Session("s1".to_string()))
            .await
            .unwrap();
        assert_eq!(owned.len(), 2);

        let due = store.list_due_reminders(at(2, 9)).await.unwrap();
        assert_eq!(due.len(), 2);
        assert!(due.iter().all(|r| r.active));
        assert!(store.list_due_reminders(at(1, 17)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_notified_updates_stored_row() {
        let store = MemoryStore::new();
        let r = reminder(Owner::User("u1".to_string()));
        store.insert_reminder(&r).await.unwrap();

        let marked = store.mark_notified(r.id, at(1, 18)).await.unwrap().unwrap();
        assert_eq!(marked.notification_count, 1);
        assert_eq!(marked.last_notified, Some(at(1, 18)));
        assert_eq!(marked.next_notification, Some(at(2, 18)));
        assert_eq!(store.get_reminder(r.id).await.unwrap(), marked);
    }

    #[tokio::test]
    async fn test_mark_notified_skips_inactive_and_missing() {
        let store = MemoryStore::new();
        let mut r = reminder(Owner::User("u1".to_string()));
        r.active = false;
        store.insert_reminder(&r).await.unwrap();

        assert_eq!(store.mark_notified(r.id, at(1, 18)).await.unwrap(), None);
        assert_eq!(store.get_reminder(r.id).await.unwrap(), r);

        assert!(matches!(
            store.mark_notified(Uuid::new_v4(), at(1, 18)).await,
            Err(PortError::NotFound(_))
        ));
    }
}
