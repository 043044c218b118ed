//! crates/practice_reminders_core/src/stats.rs
//!
//! Aggregate view over one owner's reminders.

use chrono::NaiveDateTime;

use crate::domain::Reminder;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderStats {
    pub total: usize,
    pub active: usize,
    pub due: usize,
    pub total_notifications: u32,
    pub longest_streak: u32,
    /// Earliest upcoming notification among active reminders.
    pub next_notification: Option<NaiveDateTime>,
}

pub fn summarize(reminders: &[Reminder], now: NaiveDateTime) -> ReminderStats {
    let active: Vec<&Reminder> = reminders.iter().filter(|r| r.active).collect();

    ReminderStats {
        total: reminders.len(),
        active: active.len(),
        due: active.iter().filter(|r| r.is_due(now)).count(),
        total_notifications: reminders.iter().map(|r| r.notification_count).sum(),
        longest_streak: reminders.iter().map(|r| r.streak).max().unwrap_or(0),
        next_notification: active.iter().filter_map(|r| r.next_notification).min(),
    }
}
