//! Recurring commitments (standups, weekly syncs) → busy intervals.
//!
//! Wraps the `rrule` crate (v0.13) and `chrono-tz` so a recurring meeting can be
//! turned into concrete busy intervals for one resolution request.

use chrono::{DateTime, Duration, Utc};
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};
use crate::interval::{BusyInterval, Interval};
use crate::localtime::parse_timezone;

/// Upper bound on raw instances pulled from one rule.
pub const MAX_INSTANCES: u16 = 500;

/// A recurring block of committed time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringCommitment {
    /// RFC 5545 RRULE body, e.g. `FREQ=WEEKLY;BYDAY=MO,WE,FR`.
    pub rrule: String,
    /// Local start of the first instance, e.g. `2026-03-16T09:30:00`.
    pub dtstart: String,
    pub duration_minutes: u32,
    /// IANA timezone the `dtstart` wall time is read in.
    pub timezone: String,
}

/// Expand `commitment` into the busy intervals that overlap `[range_start, range_end)`.
///
/// Instances are not clipped; the resolver clips to the request range itself.
///
/// # Errors
/// Returns `InvalidRule` for an empty or unparseable rule, `InvalidTimezone`
/// for an unknown zone, and `InvalidRange` for an empty range or zero duration.
pub fn expand_recurring(
    commitment: &RecurringCommitment,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
) -> Result<Vec<BusyInterval>> {
    if commitment.rrule.trim().is_empty() {
        return Err(AvailabilityError::InvalidRule("empty RRULE string".to_string()));
    }
    if range_start >= range_end {
        return Err(AvailabilityError::InvalidRange(format!(
            "range start {} is not before range end {}",
            range_start.to_rfc3339(),
            range_end.to_rfc3339()
        )));
    }
    if commitment.duration_minutes == 0 {
        return Err(AvailabilityError::InvalidRange(
            "recurring commitment must last at least one minute".to_string(),
        ));
    }

    let tz = parse_timezone(&commitment.timezone)?;
    let duration = Duration::minutes(i64::from(commitment.duration_minutes));

    // iCalendar wants basic format: 2026-03-16T09:30:00 -> 20260316T093000.
    let dtstart_ical = commitment.dtstart.replace(['-', ':'], "");

    // Stop expansion at the end of the range unless the rule already bounds itself.
    // UNTIL shares DTSTART's zone: bare local time, or a trailing Z for UTC.
    let mut rule = commitment.rrule.trim().to_string();
    let upper = rule.to_uppercase();
    if !upper.contains("UNTIL=") && !upper.contains("COUNT=") {
        let mut until = range_end
            .with_timezone(&tz)
            .format("%Y%m%dT%H%M%S")
            .to_string();
        if tz == chrono_tz::Tz::UTC {
            until.push('Z');
        }
        rule = format!("{rule};UNTIL={until}");
    }

    let text = format!("DTSTART;TZID={}:{}\nRRULE:{}", tz.name(), dtstart_ical, rule);
    let set: RRuleSet = text
        .parse()
        .map_err(|e| AvailabilityError::InvalidRule(format!("{e}")))?;

    // Only instances that can overlap the range count towards MAX_INSTANCES,
    // however far back DTSTART lies.
    let window_start = range_start
        .checked_sub_signed(duration)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let set = set
        .after(window_start.with_timezone(&rrule::Tz::UTC))
        .before(range_end.with_timezone(&rrule::Tz::UTC));

    let instances = set.all(MAX_INSTANCES);
    if instances.limited {
        tracing::warn!(
            rrule = %commitment.rrule,
            limit = MAX_INSTANCES,
            "recurring commitment truncated"
        );
    }

    let busy: Vec<BusyInterval> = instances
        .dates
        .into_iter()
        .filter_map(|dt| {
            let start = dt.with_timezone(&Utc);
            let end = start.checked_add_signed(duration)?;
            Some(Interval { start, end })
        })
        .filter(|i| i.start < range_end && i.end > range_start)
        .collect();

    tracing::debug!(rrule = %commitment.rrule, instances = busy.len(), "expanded recurring commitment");
    Ok(busy)
}
