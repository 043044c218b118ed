//! crates/practice_reminders_core/src/schedule.rs
//!
//! Next-notification calculation and the due-scan over a reminder collection.
//! Everything here is synchronous and bounded: at most `SCAN_DAYS` candidate
//! dates are examined per call.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeSet;

use crate::domain::Reminder;

/// Today plus the following seven days, so a full week cycle is always covered.
pub const SCAN_DAYS: u64 = 8;

/// Hour used by the fallback path when no valid preferred hour exists.
pub const FALLBACK_HOUR: u8 = 10;

/// Returns the next instant matching the recurrence fields, strictly after `now`.
///
/// Today only considers hours that are still ahead; later days take their
/// earliest preferred hour. If no weekday in the scan window matches, the
/// result is tomorrow at the earliest preferred hour.
pub fn next_occurrence(
    time_preferences: &BTreeSet<u8>,
    days_of_week: &BTreeSet<u8>,
    now: NaiveDateTime,
) -> NaiveDateTime {
    let today = now.date();

    for offset in 0..SCAN_DAYS {
        let Some(candidate) = today.checked_add_days(Days::new(offset)) else {
            break;
        };
        let weekday = candidate.weekday().num_days_from_monday() as u8;
        if !days_of_week.contains(&weekday) {
            continue;
        }

        let slot = time_preferences
            .iter()
            .filter_map(|&hour| at_hour(candidate, hour))
            .find(|slot| offset > 0 || *slot > now);
        if let Some(slot) = slot {
            return slot;
        }
    }

    let tomorrow = today.succ_opt().unwrap_or(today);
    let earliest = time_preferences
        .iter()
        .find_map(|&hour| at_hour(tomorrow, hour));
    earliest.unwrap_or_else(|| tomorrow.and_time(fallback_time()))
}

/// Recomputes and stores `reminder.next_notification`, returning the new value.
///
/// Also backfills `last_notified` with `now` for reminders that report past
/// notifications but never recorded when the last one went out.
pub fn compute_next(reminder: &mut Reminder, now: NaiveDateTime) -> NaiveDateTime {
    if reminder.notification_count > 0 && reminder.last_notified.is_none() {
        reminder.last_notified = Some(now);
    }

    let next = next_occurrence(&reminder.time_preferences, &reminder.days_of_week, now);
    reminder.next_notification = Some(next);
    next
}

impl Reminder {
    /// Active and scheduled at or before `now`. The boundary is inclusive.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.active && self.next_notification.is_some_and(|next| next <= now)
    }
}

/// Filters `reminders` down to those that should fire at `now`.
pub fn get_due(reminders: &[Reminder], now: NaiveDateTime) -> Vec<&Reminder> {
    reminders.iter().filter(|r| r.is_due(now)).collect()
}

fn at_hour(date: NaiveDate, hour: u8) -> Option<NaiveDateTime> {
    NaiveTime::from_hms_opt(u32::from(hour), 0, 0).map(|time| date.and_time(time))
}

fn fallback_time() -> NaiveTime {
    NaiveTime::from_hms_opt(u32::from(FALLBACK_HOUR), 0, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, NewReminder, Owner, ReminderType};
    use chrono::{Duration, Timelike};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn set(values: &[u8]) -> BTreeSet<u8> {
        values.iter().copied().collect()
    }

    fn reminder(frequency: Frequency, hours: Option<Vec<u8>>, days: Option<Vec<u8>>) -> Reminder {
        let input = NewReminder {
            owner: Owner::User("u-1".to_string()),
            title: "Evening reflection".to_string(),
            description: "Write three lines".to_string(),
            reminder_type: ReminderType::Reflection,
            frequency,
            time_preferences: hours,
            days_of_week: days,
            linked_content_id: None,
        };
        Reminder::create(input, at(2024, 1, 1, 0, 0, 0)).unwrap()
    }

    // 2024-01-02 is a Tuesday, 2024-01-05 a Friday.

    #[test]
    fn test_tuesday_morning_picks_remaining_slot_today() {
        let mut r = reminder(Frequency::Custom, Some(vec![9, 17]), Some(vec![1, 4]));
        let next = compute_next(&mut r, at(2024, 1, 2, 10, 0, 0));
        assert_eq!(next, at(2024, 1, 2, 17, 0, 0));
        assert_eq!(r.next_notification, Some(next));
    }

    #[test]
    fn test_tuesday_evening_rolls_to_friday_earliest_slot() {
        let mut r = reminder(Frequency::Custom, Some(vec![9, 17]), Some(vec![1, 4]));
        let next = compute_next(&mut r, at(2024, 1, 2, 18, 0, 0));
        assert_eq!(next, at(2024, 1, 5, 9, 0, 0));
    }

    #[test]
    fn test_slot_equal_to_now_is_not_reused() {
        let next = next_occurrence(&set(&[9, 17]), &set(&[1, 4]), at(2024, 1, 2, 17, 0, 0));
        assert_eq!(next, at(2024, 1, 5, 9, 0, 0));
    }

    #[test]
    fn test_daily_default_same_day_or_next_day() {
        let mut r = reminder(Frequency::Daily, None, None);
        let start = at(2024, 3, 10, 0, 0, 0);
        for minutes in (0..24 * 60).step_by(17) {
            let now = start + Duration::minutes(minutes);
            let next = compute_next(&mut r, now);
            if now.hour() < 18 {
                assert_eq!(next, now.date().and_hms_opt(18, 0, 0).unwrap());
            } else {
                let tomorrow = now.date().succ_opt().unwrap();
                assert_eq!(next, tomorrow.and_hms_opt(18, 0, 0).unwrap());
            }
        }
    }

    #[test]
    fn test_result_matches_recurrence_fields() {
        let patterns = [
            (set(&[6, 12, 21]), set(&[0, 3])),
            (set(&[23]), set(&[6])),
            (set(&[0, 1]), set(&[2, 5])),
            (set(&[10]), set(&[0, 1, 2, 3, 4, 5, 6])),
        ];
        let start = at(2024, 2, 26, 0, 30, 0);
        for (hours, days) in patterns {
            for step in 0..(14 * 24) {
                let now = start + Duration::hours(step);
                let next = next_occurrence(&hours, &days, now);
                assert!(next > now);
                assert!(hours.contains(&(next.hour() as u8)));
                assert!(days.contains(&(next.weekday().num_days_from_monday() as u8)));
                assert_eq!((next.minute(), next.second()), (0, 0));
            }
        }
    }

    #[test]
    fn test_weekly_on_same_weekday_after_slot_wraps_a_full_week() {
        // Monday 2024-01-01 at 11:00, weekly default is Monday 10:00.
        let next = next_occurrence(&set(&[10]), &set(&[0]), at(2024, 1, 1, 11, 0, 0));
        assert_eq!(next, at(2024, 1, 8, 10, 0, 0));
    }

    #[test]
    fn test_compute_next_is_idempotent_for_frozen_now() {
        let mut r = reminder(Frequency::TwiceWeekly, None, None);
        let now = at(2024, 1, 3, 12, 0, 0);
        let first = compute_next(&mut r, now);
        let second = compute_next(&mut r, now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_days_fall_back_to_tomorrow() {
        let next = next_occurrence(&set(&[15, 8]), &BTreeSet::new(), at(2024, 1, 2, 10, 0, 0));
        assert_eq!(next, at(2024, 1, 3, 8, 0, 0));

        let next = next_occurrence(&BTreeSet::new(), &set(&[1]), at(2024, 1, 2, 10, 0, 0));
        assert_eq!(next, at(2024, 1, 3, 10, 0, 0));
    }

    #[test]
    fn test_backfills_last_notified_once() {
        let mut r = reminder(Frequency::Daily, None, None);
        r.notification_count = 3;
        let now = at(2024, 1, 4, 9, 0, 0);
        compute_next(&mut r, now);
        assert_eq!(r.last_notified, Some(now));

        compute_next(&mut r, at(2024, 1, 5, 9, 0, 0));
        assert_eq!(r.last_notified, Some(now));
    }

    #[test]
    fn test_no_backfill_without_notifications() {
        let mut r = reminder(Frequency::Daily, None, None);
        compute_next(&mut r, at(2024, 1, 4, 9, 0, 0));
        assert_eq!(r.last_notified, None);
    }

    #[test]
    fn test_get_due_boundary_is_inclusive() {
        let now = at(2024, 1, 2, 17, 0, 0);
        let mut exact = reminder(Frequency::Daily, None, None);
        exact.next_notification = Some(now);
        let mut later = reminder(Frequency::Daily, None, None);
        later.next_notification = Some(now + Duration::seconds(1));

        let reminders = vec![exact.clone(), later];
        let due = get_due(&reminders, now);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, exact.id);
    }

    #[test]
    fn test_get_due_skips_inactive_and_unscheduled() {
        let now = at(2024, 1, 2, 17, 0, 0);
        let mut inactive = reminder(Frequency::Daily, None, None);
        inactive.next_notification = Some(now - Duration::hours(1));
        inactive.active = false;
        let mut unscheduled = reminder(Frequency::Daily, None, None);
        unscheduled.next_notification = None;
        let mut overdue = reminder(Frequency::Daily, None, None);
        overdue.next_notification = Some(now - Duration::days(2));

        let reminders = vec![inactive, unscheduled, overdue.clone()];
        let due = get_due(&reminders, now);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, overdue.id);
        assert!(due.iter().all(|r| r.active));
    }
}
