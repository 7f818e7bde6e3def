//! Local wall-clock to UTC conversion with DST transition policies.
//!
//! Working hours are expressed as local hours of the day, so every day bound
//! goes through [`resolve_local`]. Datetime strings from callers go through
//! [`parse_datetime`].

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{AvailabilityError, Result};

/// Policy for local times that fall in a DST gap (e.g. 02:30 during spring forward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstPolicy {
    /// Move the wall time forward by the length of the gap.
    #[default]
    ShiftForward,
    /// Treat the local time as unusable.
    Skip,
}

/// Parse an IANA timezone identifier.
///
/// # Errors
/// Returns `AvailabilityError::InvalidTimezone` if the name is unknown.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| AvailabilityError::InvalidTimezone(name.to_string()))
}

/// Convert a local wall-clock time in `tz` to UTC.
///
/// Ambiguous times (fall back) resolve to the earliest instant. Times inside a
/// spring-forward gap follow `policy`; `Skip` yields `None`.
pub fn resolve_local(tz: Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => {
                // Interpret the wall time with the offset in force before the gap.
                let before = local - Duration::hours(24);
                let offset = tz.offset_from_local_datetime(&before).earliest()?;
                let seconds = i64::from(offset.fix().local_minus_utc());
                Some(Utc.from_utc_datetime(&(local - Duration::seconds(seconds))))
            }
        },
    }
}

/// Parse a caller-supplied datetime.
///
/// Accepted forms:
/// - RFC 3339 with an offset (`2026-03-16T10:00:00+05:30`, `...Z`)
/// - naive local time (`2026-03-16T10:00:00` or `2026-03-16T10:00`), read in `tz`
/// - a bare date (`2026-03-16`), read as local midnight in `tz`
///
/// # Errors
/// Returns `AvailabilityError::InvalidDatetime` if no form matches or the
/// local time does not exist in `tz`.
pub fn parse_datetime(s: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(|d| d.and_time(NaiveTime::default()))
        })
        .map_err(|e| AvailabilityError::InvalidDatetime(format!("'{s}': {e}")))?;

    resolve_local(tz, naive, DstPolicy::ShiftForward)
        .ok_or_else(|| AvailabilityError::InvalidDatetime(format!("'{s}' does not exist in {tz}")))
}
