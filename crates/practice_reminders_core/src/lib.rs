pub mod domain;
pub mod format;
pub mod ports;
pub mod schedule;
pub mod stats;

pub use domain::{DomainError, Frequency, NewReminder, Owner, Reminder, ReminderType, ReminderUpdate};
pub use format::{format_days_of_week, format_schedule, format_time};
pub use ports::{NotificationService, PortError, PortResult, ReminderStore};
pub use schedule::{compute_next, get_due, next_occurrence};
pub use stats::{summarize, ReminderStats};
