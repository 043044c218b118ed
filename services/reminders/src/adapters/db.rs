//! services/reminders/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ReminderStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use practice_reminders_core::domain::{Owner, Reminder, MAX_HOUR, MAX_WEEKDAY};
use practice_reminders_core::ports::{PortError, PortResult, ReminderStore};
use sqlx::{FromRow, PgPool};
use std::collections::BTreeSet;
use std::fmt::Display;
use uuid::Uuid;

const REMINDER_COLUMNS: &str = "id, owner_kind, owner_id, title, description, reminder_type, \
    frequency, time_preferences, days_of_week, active, linked_content_id, created_at, \
    last_notified, next_notification, notification_count, streak";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ReminderStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Struct
//=========================================================================================

#[derive(FromRow)]
struct ReminderRecord {
    id: Uuid,
    owner_kind: String,
    owner_id: String,
    title: String,
    description: String,
    reminder_type: String,
    frequency: String,
    time_preferences: Vec<i16>,
    days_of_week: Vec<i16>,
    active: bool,
    linked_content_id: Option<String>,
    created_at: NaiveDateTime,
    last_notified: Option<NaiveDateTime>,
    next_notification: Option<NaiveDateTime>,
    notification_count: i32,
    streak: i32,
}

impl ReminderRecord {
    fn to_domain(self) -> PortResult<Reminder> {
        let id = self.id;
        let owner = Owner::from_parts(&self.owner_kind, self.owner_id)
            .ok_or_else(|| corrupt(id, format!("unknown owner kind '{}'", self.owner_kind)))?;

        Ok(Reminder {
            id,
            owner,
            title: self.title,
            description: self.description,
            reminder_type: self.reminder_type.parse().map_err(|e| corrupt(id, e))?,
            frequency: self.frequency.parse().map_err(|e| corrupt(id, e))?,
            time_preferences: small_ints_to_set(&self.time_preferences, MAX_HOUR, "hour")
                .map_err(|e| corrupt(id, e))?,
            days_of_week: small_ints_to_set(&self.days_of_week, MAX_WEEKDAY, "weekday")
                .map_err(|e| corrupt(id, e))?,
            active: self.active,
            linked_content_id: self.linked_content_id,
            created_at: self.created_at,
            last_notified: self.last_notified,
            next_notification: self.next_notification,
            notification_count: counter_from_db(self.notification_count, "notification_count")
                .map_err(|e| corrupt(id, e))?,
            streak: counter_from_db(self.streak, "streak").map_err(|e| corrupt(id, e))?,
        })
    }
}

fn corrupt(reminder_id: Uuid, detail: impl Display) -> PortError {
    PortError::Unexpected(format!("Reminder {} is corrupt: {}", reminder_id, detail))
}

fn small_ints_to_set(values: &[i16], max: u8, what: &str) -> Result<BTreeSet<u8>, String> {
    values
        .iter()
        .map(|&v| {
            u8::try_from(v)
                .ok()
                .filter(|v| *v <= max)
                .ok_or_else(|| format!("{} {} is outside 0-{}", what, v, max))
        })
        .collect()
}

fn counter_from_db(value: i32, what: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{} is negative ({})", what, value))
}

fn set_to_small_ints(values: &BTreeSet<u8>) -> Vec<i16> {
    values.iter().map(|v| i16::from(*v)).collect()
}

fn counter_to_db(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn map_fetch_error(e: sqlx::Error, reminder_id: Uuid) -> PortError {
    match e {
        sqlx::Error::RowNotFound => {
            PortError::NotFound(format!("Reminder {} not found", reminder_id))
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `ReminderStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReminderStore for DbAdapter {
    async fn insert_reminder(&self, reminder: &Reminder) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO reminders (id, owner_kind, owner_id, title, description, reminder_type, \
             frequency, time_preferences, days_of_week, active, linked_content_id, created_at, \
             last_notified, next_notification, notification_count, streak) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(reminder.id)
        .bind(reminder.owner.kind())
        .bind(reminder.owner.id())
        .bind(&reminder.title)
        .bind(&reminder.description)
        .bind(reminder.reminder_type.as_str())
        .bind(reminder.frequency.as_str())
        .bind(set_to_small_ints(&reminder.time_preferences))
        .bind(set_to_small_ints(&reminder.days_of_week))
        .bind(reminder.active)
        .bind(&reminder.linked_content_id)
        .bind(reminder.created_at)
        .bind(reminder.last_notified)
        .bind(reminder.next_notification)
        .bind(counter_to_db(reminder.notification_count))
        .bind(counter_to_db(reminder.streak))
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn get_reminder(&self, reminder_id: Uuid) -> PortResult<Reminder> {
        let query = format!("SELECT {} FROM reminders WHERE id = $1", REMINDER_COLUMNS);
        let record = sqlx::query_as::<_, ReminderRecord>(&query)
            .bind(reminder_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_fetch_error(e, reminder_id))?;
        record.to_domain()
    }

    async fn save_reminder(&self, reminder: &Reminder) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE reminders SET title = $2, description = $3, reminder_type = $4, \
             frequency = $5, time_preferences = $6, days_of_week = $7, active = $8, \
             linked_content_id = $9, last_notified = $10, next_notification = $11, \
             notification_count = $12, streak = $13 WHERE id = $1",
        )
        .bind(reminder.id)
        .bind(&reminder.title)
        .bind(&reminder.description)
        .bind(reminder.reminder_type.as_str())
        .bind(reminder.frequency.as_str())
        .bind(set_to_small_ints(&reminder.time_preferences))
        .bind(set_to_small_ints(&reminder.days_of_week))
        .bind(reminder.active)
        .bind(&reminder.linked_content_id)
        .bind(reminder.last_notified)
        .bind(reminder.next_notification)
        .bind(counter_to_db(reminder.notification_count))
        .bind(counter_to_db(reminder.streak))
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Reminder {} not found",
                reminder.id
            )));
        }
        Ok(())
    }

    async fn delete_reminder(&self, reminder_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = $1")
            .bind(reminder_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Reminder {} not found",
                reminder_id
            )));
        }
        Ok(())
    }

    async fn list_reminders_for_owner(&self, owner: &Owner) -> PortResult<Vec<Reminder>> {
        let query = format!(
            "SELECT {} FROM reminders WHERE owner_kind = $1 AND owner_id = $2 ORDER BY created_at ASC",
            REMINDER_COLUMNS
        );
        let records = sqlx::query_as::<_, ReminderRecord>(&query)
            .bind(owner.kind())
            .bind(owner.id())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_due_reminders(&self, now: NaiveDateTime) -> PortResult<Vec<Reminder>> {
        let query = format!(
            "SELECT {} FROM reminders WHERE active AND next_notification <= $1 \
             ORDER BY next_notification ASC",
            REMINDER_COLUMNS
        );
        let records = sqlx::query_as::<_, ReminderRecord>(&query)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn mark_notified(
        &self,
        reminder_id: Uuid,
        now: NaiveDateTime,
    ) -> PortResult<Option<Reminder>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Row lock so a concurrent update or delete is seen, not overwritten.
        let query = format!(
            "SELECT {} FROM reminders WHERE id = $1 FOR UPDATE",
            REMINDER_COLUMNS
        );
        let record = sqlx::query_as::<_, ReminderRecord>(&query)
            .bind(reminder_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_fetch_error(e, reminder_id))?;

        let mut reminder = record.to_domain()?;
        if !reminder.active {
            return Ok(None);
        }
        reminder.record_notification(now);

        sqlx::query(
            "UPDATE reminders SET last_notified = $2, next_notification = $3, \
             notification_count = $4 WHERE id = $1",
        )
        .bind(reminder.id)
        .bind(reminder.last_notified)
        .bind(reminder.next_notification)
        .bind(counter_to_db(reminder.notification_count))
        .execute(&mut *tx)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Some(reminder))
    }
}
