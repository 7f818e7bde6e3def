//! Tests for expanding recurring commitments into busy intervals.

use availability_engine::error::AvailabilityError;
use availability_engine::{
    expand_recurring, find_free_slots, RecurringCommitment, SlotRequest, WorkingHoursWindow,
};
use chrono::{Datelike, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

fn standup(rrule: &str, timezone: &str) -> RecurringCommitment {
    RecurringCommitment {
        rrule: rrule.to_string(),
        dtstart: "2026-03-16T09:30:00".to_string(),
        duration_minutes: 15,
        timezone: timezone.to_string(),
    }
}

#[test]
fn daily_standup_within_range() {
    let range_start = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
    let range_end = Utc.with_ymd_and_hms(2026, 3, 19, 0, 0, 0).unwrap();

    let busy = expand_recurring(&standup("FREQ=DAILY", "UTC"), range_start, range_end).unwrap();

    assert_eq!(busy.len(), 3);
    for (i, b) in busy.iter().enumerate() {
        assert_eq!(b.start.day(), 16 + i as u32);
        assert_eq!((b.start.hour(), b.start.minute()), (9, 30));
        assert_eq!(b.duration_minutes(), 15);
    }
}

#[test]
fn weekly_rule_respects_byday() {
    let range_start = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
    let range_end = Utc.with_ymd_and_hms(2026, 3, 30, 0, 0, 0).unwrap();

    let busy = expand_recurring(
        &standup("FREQ=WEEKLY;BYDAY=MO,WE", "UTC"),
        range_start,
        range_end,
    )
    .unwrap();

    assert_eq!(busy.len(), 4);
    for b in &busy {
        assert!(matches!(b.start.weekday(), Weekday::Mon | Weekday::Wed));
    }
}

#[test]
fn instances_before_range_are_dropped() {
    let range_start = Utc.with_ymd_and_hms(2026, 3, 18, 0, 0, 0).unwrap();
    let range_end = Utc.with_ymd_and_hms(2026, 3, 19, 0, 0, 0).unwrap();

    let busy = expand_recurring(&standup("FREQ=DAILY", "UTC"), range_start, range_end).unwrap();
    assert_eq!(busy.len(), 1);
    assert_eq!(busy[0].start.day(), 18);
}

#[test]
fn long_running_series_still_blocks_current_range() {
    // More than 800 daily occurrences precede the range.
    let commitment = RecurringCommitment {
        dtstart: "2024-01-01T09:30:00".to_string(),
        ..standup("FREQ=DAILY", "UTC")
    };
    let range_start = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
    let range_end = Utc.with_ymd_and_hms(2026, 3, 19, 0, 0, 0).unwrap();

    let busy = expand_recurring(&commitment, range_start, range_end).unwrap();

    assert_eq!(busy.len(), 3);
    assert_eq!(busy[0].start, Utc.with_ymd_and_hms(2026, 3, 16, 9, 30, 0).unwrap());
    assert_eq!(busy[2].start, Utc.with_ymd_and_hms(2026, 3, 18, 9, 30, 0).unwrap());
}

#[test]
fn instance_running_into_range_is_kept() {
    let commitment = RecurringCommitment {
        dtstart: "2024-01-01T23:30:00".to_string(),
        duration_minutes: 60,
        ..standup("FREQ=DAILY", "UTC")
    };
    let range_start = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
    let range_end = Utc.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap();

    let busy = expand_recurring(&commitment, range_start, range_end).unwrap();

    assert_eq!(busy.len(), 1);
    assert_eq!(busy[0].start, Utc.with_ymd_and_hms(2026, 3, 15, 23, 30, 0).unwrap());
}

#[test]
fn local_wall_time_is_kept_in_timezone() {
    let range_start = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
    let range_end = Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap();

    let busy = expand_recurring(
        &standup("FREQ=DAILY;COUNT=1", "Asia/Kolkata"),
        range_start,
        range_end,
    )
    .unwrap();
    // 09:30 IST = 04:00 UTC
    assert_eq!(busy.len(), 1);
    assert_eq!((busy[0].start.hour(), busy[0].start.minute()), (4, 0));
}

#[test]
fn expanded_standups_block_free_slots() {
    let range_start = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
    let range_end = Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap();
    let busy = expand_recurring(&standup("FREQ=DAILY", "UTC"), range_start, range_end).unwrap();

    let window = WorkingHoursWindow::new(9, 17, Tz::UTC).unwrap();
    let slots = find_free_slots(&busy, &window, &SlotRequest::new(30, range_start, range_end)).unwrap();

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].duration_minutes, 30);
    assert_eq!(slots[1].start, Utc.with_ymd_and_hms(2026, 3, 16, 9, 45, 0).unwrap());
}

#[test]
fn empty_rule_is_rejected() {
    let range_start = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
    let range_end = Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap();
    assert!(matches!(
        expand_recurring(&standup("", "UTC"), range_start, range_end),
        Err(AvailabilityError::InvalidRule(_))
    ));
}

#[test]
fn garbage_rule_is_rejected() {
    let range_start = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
    let range_end = Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap();
    assert!(matches!(
        expand_recurring(&standup("FREQ=SOMETIMES", "UTC"), range_start, range_end),
        Err(AvailabilityError::InvalidRule(_))
    ));
}

#[test]
fn unknown_timezone_is_rejected() {
    let range_start = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
    let range_end = Utc.with_ymd_and_hms(2026, 3, 17, 0, 0, 0).unwrap();
    assert!(matches!(
        expand_recurring(&standup("FREQ=DAILY", "Nowhere/Special"), range_start, range_end),
        Err(AvailabilityError::InvalidTimezone(_))
    ));
}
