//! Recurring daily working-hours window.
//!
//! A window is a pair of local hours plus an IANA timezone and a set of
//! working weekdays. [`WorkingHoursWindow::day_bounds`] turns one local
//! calendar day into a concrete UTC interval.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{AvailabilityError, Result};
use crate::interval::Interval;
use crate::localtime::{parse_timezone, resolve_local, DstPolicy};

pub const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// The daily time-of-day range eligible for scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingHoursWindow {
    start_hour: u32,
    end_hour: u32,
    timezone: Tz,
    /// Bit `n` is set when `Weekday::num_days_from_monday() == n` is a working day.
    days: u8,
    dst_policy: DstPolicy,
}

impl WorkingHoursWindow {
    /// Build a window open every day of the week.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidWorkingHours` unless
    /// `start_hour < end_hour <= 23`.
    pub fn new(start_hour: u32, end_hour: u32, timezone: Tz) -> Result<Self> {
        if start_hour > 23 || end_hour > 23 || start_hour >= end_hour {
            return Err(AvailabilityError::InvalidWorkingHours {
                start: start_hour,
                end: end_hour,
            });
        }
        Ok(Self {
            start_hour,
            end_hour,
            timezone,
            days: days_mask(&ALL_DAYS),
            dst_policy: DstPolicy::default(),
        })
    }

    /// Build a window from a timezone name and an explicit set of working days.
    ///
    /// # Errors
    /// Returns `InvalidTimezone` for an unknown zone and `InvalidWorkingHours`
    /// for out-of-range hours.
    pub fn from_parts(
        start_hour: u32,
        end_hour: u32,
        timezone: &str,
        working_days: &[Weekday],
    ) -> Result<Self> {
        let tz = parse_timezone(timezone)?;
        Ok(Self::new(start_hour, end_hour, tz)?.with_working_days(working_days))
    }

    pub fn with_working_days(mut self, days: &[Weekday]) -> Self {
        self.days = days_mask(days);
        self
    }

    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn dst_policy(&self) -> DstPolicy {
        self.dst_policy
    }

    pub fn working_days(&self) -> Vec<Weekday> {
        ALL_DAYS
            .iter()
            .copied()
            .filter(|d| self.is_working_day(*d))
            .collect()
    }

    pub fn is_working_day(&self, day: Weekday) -> bool {
        self.days & (1 << day.num_days_from_monday()) != 0
    }

    /// The working interval of a local calendar day, in UTC.
    ///
    /// Returns `None` on non-working days, and when a bound falls in a DST
    /// gap under `DstPolicy::Skip`.
    pub fn day_bounds(&self, date: NaiveDate) -> Option<Interval> {
        if !self.is_working_day(date.weekday()) {
            return None;
        }
        let start = resolve_local(
            self.timezone,
            date.and_time(NaiveTime::from_hms_opt(self.start_hour, 0, 0)?),
            self.dst_policy,
        )?;
        let end = resolve_local(
            self.timezone,
            date.and_time(NaiveTime::from_hms_opt(self.end_hour, 0, 0)?),
            self.dst_policy,
        )?;
        Interval::new(start, end).ok()
    }

    /// Serializable snapshot for reporting the effective configuration.
    pub fn summary(&self) -> WindowSummary {
        WindowSummary {
            start_hour: self.start_hour,
            end_hour: self.end_hour,
            timezone: self.timezone.name().to_string(),
            working_days: self.working_days().iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Plain view of a [`WorkingHoursWindow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowSummary {
    pub start_hour: u32,
    pub end_hour: u32,
    pub timezone: String,
    pub working_days: Vec<String>,
}

fn days_mask(days: &[Weekday]) -> u8 {
    days.iter()
        .fold(0u8, |mask, d| mask | (1 << d.num_days_from_monday()))
}
