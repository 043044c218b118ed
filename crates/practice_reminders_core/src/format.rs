//! crates/practice_reminders_core/src/format.rs
//!
//! Human-readable labels for reminder schedules. Display only; nothing here
//! feeds back into scheduling.

use crate::domain::Reminder;
use std::collections::BTreeSet;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Formats an hour-of-day as a 12-hour clock label, e.g. `13` -> `"1:00 PM"`.
pub fn format_time(hour: u8) -> String {
    match hour {
        0 => "12:00 AM".to_string(),
        12 => "12:00 PM".to_string(),
        h if h < 12 => format!("{}:00 AM", h),
        h => format!("{}:00 PM", h - 12),
    }
}

/// Describes a set of weekdays (0 = Monday) in words.
///
/// Full week, Monday-Friday and Saturday-Sunday collapse to a single word;
/// anything else lists the day names.
pub fn format_days_of_week(days: &[u8]) -> String {
    let days: BTreeSet<u8> = days.iter().copied().filter(|d| *d < 7).collect();

    if days.len() == 7 {
        return "Every day".to_string();
    }
    if days == BTreeSet::from([0, 1, 2, 3, 4]) {
        return "Weekdays".to_string();
    }
    if days == BTreeSet::from([5, 6]) {
        return "Weekends".to_string();
    }

    let names: Vec<String> = days
        .iter()
        .map(|&d| DAY_NAMES[d as usize].to_string())
        .collect();
    if names.is_empty() {
        return "No days".to_string();
    }
    join_with_and(&names)
}

/// Full schedule line for a reminder, e.g. `"Weekdays at 9:00 AM and 5:00 PM"`.
pub fn format_schedule(reminder: &Reminder) -> String {
    let days: Vec<u8> = reminder.days_of_week.iter().copied().collect();
    let times: Vec<String> = reminder
        .time_preferences
        .iter()
        .map(|&h| format_time(h))
        .collect();

    if times.is_empty() {
        return format_days_of_week(&days);
    }
    format!("{} at {}", format_days_of_week(&days), join_with_and(&times))
}

fn join_with_and(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}
