//! Working-hour overlap across participants in different timezones.

use chrono::{NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::Serialize;

use crate::error::{AvailabilityError, Result};
use crate::localtime::parse_timezone;

/// One participant's wall clock at a given UTC hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalClock {
    pub timezone: String,
    /// `HH:MM` local time.
    pub local_time: String,
}

/// A UTC hour at which every participant is inside working hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedHour {
    pub utc_hour: u32,
    pub participants: Vec<LocalClock>,
}

/// UTC hours of `date` at which every timezone's local hour is in
/// `[start_hour, end_hour)`, in ascending order.
///
/// # Errors
/// Returns `InvalidTimezone` for an unknown zone and `InvalidWorkingHours`
/// unless `start_hour < end_hour <= 24`.
pub fn shared_working_hours(
    timezones: &[&str],
    start_hour: u32,
    end_hour: u32,
    date: NaiveDate,
) -> Result<Vec<SharedHour>> {
    if start_hour >= end_hour || end_hour > 24 {
        return Err(AvailabilityError::InvalidWorkingHours {
            start: start_hour,
            end: end_hour,
        });
    }
    let zones = timezones
        .iter()
        .map(|name| parse_timezone(name))
        .collect::<Result<Vec<_>>>()?;

    let mut shared = Vec::new();
    for utc_hour in 0..24 {
        let Some(time) = NaiveTime::from_hms_opt(utc_hour, 0, 0) else {
            continue;
        };
        let instant = Utc.from_utc_datetime(&date.and_time(time));

        let clocks: Vec<_> = zones.iter().map(|tz| instant.with_timezone(tz)).collect();
        if !clocks
            .iter()
            .all(|local| (start_hour..end_hour).contains(&local.hour()))
        {
            continue;
        }

        shared.push(SharedHour {
            utc_hour,
            participants: clocks
                .iter()
                .map(|local| LocalClock {
                    timezone: local.timezone().name().to_string(),
                    local_time: local.format("%H:%M").to_string(),
                })
                .collect(),
        });
    }

    Ok(shared)
}
