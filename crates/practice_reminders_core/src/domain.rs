//! crates/practice_reminders_core/src/domain.rs
//!
//! Defines the pure, core data structures for practice reminders.
//! These structs are independent of any database or serialization format.

use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::schedule;

/// Highest valid hour-of-day in `time_preferences`.
pub const MAX_HOUR: u8 = 23;
/// Highest valid weekday (0 = Monday .. 6 = Sunday).
pub const MAX_WEEKDAY: u8 = 6;

//=========================================================================================
// Domain Errors
//=========================================================================================

/// Validation failures raised while building or updating a `Reminder`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Unknown frequency: {0}")]
    UnknownFrequency(String),
    #[error("Unknown reminder type: {0}")]
    UnknownReminderType(String),
    #[error("Hour {0} is outside 0-23")]
    InvalidHour(u8),
    #[error("Weekday {0} is outside 0-6")]
    InvalidWeekday(u8),
    #[error("Reminder title must not be empty")]
    EmptyTitle,
}

//=========================================================================================
// Enumerations
//=========================================================================================

/// What kind of practice a reminder points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderType {
    Exercise,
    Technique,
    JourneyMilestone,
    Reflection,
    Custom,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderType::Exercise => "exercise",
            ReminderType::Technique => "technique",
            ReminderType::JourneyMilestone => "journey_milestone",
            ReminderType::Reflection => "reflection",
            ReminderType::Custom => "custom",
        }
    }
}

impl FromStr for ReminderType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exercise" => Ok(ReminderType::Exercise),
            "technique" => Ok(ReminderType::Technique),
            "journey_milestone" => Ok(ReminderType::JourneyMilestone),
            "reflection" => Ok(ReminderType::Reflection),
            "custom" => Ok(ReminderType::Custom),
            other => Err(DomainError::UnknownReminderType(other.to_string())),
        }
    }
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a reminder recurs. Drives the default recurrence fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    EveryOtherDay,
    TwiceWeekly,
    Weekly,
    Custom,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::EveryOtherDay => "every_other_day",
            Frequency::TwiceWeekly => "twice_weekly",
            Frequency::Weekly => "weekly",
            Frequency::Custom => "custom",
        }
    }

    /// Hours used when the caller does not supply `time_preferences`.
    pub fn default_time_preferences(&self) -> BTreeSet<u8> {
        match self {
            Frequency::Daily => BTreeSet::from([18]),
            _ => BTreeSet::from([10]),
        }
    }

    /// Weekdays used when the caller does not supply `days_of_week`.
    pub fn default_days_of_week(&self) -> BTreeSet<u8> {
        match self {
            Frequency::Daily => (0..=MAX_WEEKDAY).collect(),
            Frequency::EveryOtherDay => BTreeSet::from([0, 2, 4, 6]),
            Frequency::TwiceWeekly => BTreeSet::from([1, 4]),
            Frequency::Weekly => BTreeSet::from([0]),
            Frequency::Custom => BTreeSet::from([0, 2, 4]),
        }
    }
}

impl FromStr for Frequency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "every_other_day" => Ok(Frequency::EveryOtherDay),
            "twice_weekly" => Ok(Frequency::TwiceWeekly),
            "weekly" => Ok(Frequency::Weekly),
            "custom" => Ok(Frequency::Custom),
            other => Err(DomainError::UnknownFrequency(other.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a reminder belongs to: a signed-in user, or else an anonymous session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    User(String),
    Session(String),
}

impl Owner {
    pub fn kind(&self) -> &'static str {
        match self {
            Owner::User(_) => "user",
            Owner::Session(_) => "session",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Owner::User(id) | Owner::Session(id) => id,
        }
    }

    /// Rebuilds an owner from its stored `(kind, id)` pair.
    pub fn from_parts(kind: &str, id: String) -> Option<Self> {
        match kind {
            "user" => Some(Owner::User(id)),
            "session" => Some(Owner::Session(id)),
            _ => None,
        }
    }
}

//=========================================================================================
// Reminder
//=========================================================================================

/// A recurring practice reminder and its scheduling state.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: Uuid,
    pub owner: Owner,
    pub title: String,
    pub description: String,
    pub reminder_type: ReminderType,
    pub frequency: Frequency,
    pub time_preferences: BTreeSet<u8>,
    pub days_of_week: BTreeSet<u8>,
    pub active: bool,
    pub linked_content_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_notified: Option<NaiveDateTime>,
    /// When this reminder fires next. The only field the due-scan reads.
    pub next_notification: Option<NaiveDateTime>,
    pub notification_count: u32,
    pub streak: u32,
}

/// Caller input for creating a reminder. `None` or empty recurrence fields
/// fall back to the frequency defaults.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub owner: Owner,
    pub title: String,
    pub description: String,
    pub reminder_type: ReminderType,
    pub frequency: Frequency,
    pub time_preferences: Option<Vec<u8>>,
    pub days_of_week: Option<Vec<u8>>,
    pub linked_content_id: Option<String>,
}

/// A partial update. Only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct ReminderUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reminder_type: Option<ReminderType>,
    pub frequency: Option<Frequency>,
    pub time_preferences: Option<Vec<u8>>,
    pub days_of_week: Option<Vec<u8>>,
    pub active: Option<bool>,
    pub linked_content_id: Option<String>,
}

impl Reminder {
    /// Builds a reminder from caller input, resolving defaults and computing
    /// the first `next_notification` relative to `now`.
    pub fn create(new: NewReminder, now: NaiveDateTime) -> Result<Self, DomainError> {
        let title = validate_title(&new.title)?;
        let time_preferences = resolve_hours(new.time_preferences, new.frequency)?;
        let days_of_week = resolve_weekdays(new.days_of_week, new.frequency)?;

        let mut reminder = Reminder {
            id: Uuid::new_v4(),
            owner: new.owner,
            title,
            description: new.description,
            reminder_type: new.reminder_type,
            frequency: new.frequency,
            time_preferences,
            days_of_week,
            active: true,
            linked_content_id: new.linked_content_id,
            created_at: now,
            last_notified: None,
            next_notification: None,
            notification_count: 0,
            streak: 0,
        };
        schedule::compute_next(&mut reminder, now);
        Ok(reminder)
    }

    /// Applies a partial update and recomputes `next_notification`.
    ///
    /// Validation happens before any field is touched, so a rejected update
    /// leaves the reminder unchanged.
    pub fn apply_update(
        &mut self,
        update: ReminderUpdate,
        now: NaiveDateTime,
    ) -> Result<(), DomainError> {
        let frequency = update.frequency.unwrap_or(self.frequency);
        let title = update.title.as_deref().map(validate_title).transpose()?;
        let time_preferences = match update.time_preferences {
            Some(hours) => Some(resolve_hours(Some(hours), frequency)?),
            None => None,
        };
        let days_of_week = match update.days_of_week {
            Some(days) => Some(resolve_weekdays(Some(days), frequency)?),
            None => None,
        };

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(reminder_type) = update.reminder_type {
            self.reminder_type = reminder_type;
        }
        self.frequency = frequency;
        if let Some(hours) = time_preferences {
            self.time_preferences = hours;
        }
        if let Some(days) = days_of_week {
            self.days_of_week = days;
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        if update.linked_content_id.is_some() {
            self.linked_content_id = update.linked_content_id;
        }

        schedule::compute_next(self, now);
        Ok(())
    }

    /// Records a completed practice session and schedules the next one.
    pub fn record_completion(&mut self, now: NaiveDateTime) {
        self.streak = self.streak.saturating_add(1);
        schedule::compute_next(self, now);
    }

    /// Records that a notification went out at `now` and schedules the next one.
    pub fn record_notification(&mut self, now: NaiveDateTime) {
        self.last_notified = Some(now);
        self.notification_count = self.notification_count.saturating_add(1);
        schedule::compute_next(self, now);
    }
}

fn validate_title(title: &str) -> Result<String, DomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

fn resolve_hours(hours: Option<Vec<u8>>, frequency: Frequency) -> Result<BTreeSet<u8>, DomainError> {
    match hours {
        Some(hours) if !hours.is_empty() => hours
            .into_iter()
            .map(|h| if h > MAX_HOUR { Err(DomainError::InvalidHour(h)) } else { Ok(h) })
            .collect(),
        _ => Ok(frequency.default_time_preferences()),
    }
}

fn resolve_weekdays(
    days: Option<Vec<u8>>,
    frequency: Frequency,
) -> Result<BTreeSet<u8>, DomainError> {
    match days {
        Some(days) if !days.is_empty() => days
            .into_iter()
            .map(|d| if d > MAX_WEEKDAY { Err(DomainError::InvalidWeekday(d)) } else { Ok(d) })
            .collect(),
        _ => Ok(frequency.default_days_of_week()),
    }
}
