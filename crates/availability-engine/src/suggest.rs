//! Alternative meeting times for a candidate that does not fit.

use chrono::{Days, NaiveTime};

use crate::error::{AvailabilityError, Result};
use crate::interval::{BusyInterval, Interval};
use crate::localtime::{resolve_local, DstPolicy};
use crate::resolver::{find_free_slots, SlotRequest};
use crate::window::WorkingHoursWindow;

/// Number of local days searched, starting with the candidate's own day.
pub const SEARCH_DAYS: u64 = 7;

/// Suggest up to `count` conflict-free intervals with the candidate's duration.
///
/// The search covers [`SEARCH_DAYS`] local days beginning with the day the
/// candidate starts on. Each suggestion starts at the beginning of a free
/// slot and lasts exactly as long as the candidate. `buffer_minutes` is kept
/// clear around every busy interval.
///
/// # Errors
/// Returns `AvailabilityError::InvalidRange` if the candidate is empty or
/// inverted, or the buffer is negative.
pub fn suggest_alternatives(
    candidate: &Interval,
    busy: &[BusyInterval],
    window: &WorkingHoursWindow,
    count: usize,
    buffer_minutes: i64,
) -> Result<Vec<Interval>> {
    if !candidate.is_valid() {
        return Err(AvailabilityError::InvalidRange(format!(
            "candidate start {} is not before end {}",
            candidate.start.to_rfc3339(),
            candidate.end.to_rfc3339()
        )));
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let tz = window.timezone();
    let first_day = candidate.start.with_timezone(&tz).date_naive();
    let search_start = resolve_local(
        tz,
        first_day.and_time(NaiveTime::default()),
        DstPolicy::ShiftForward,
    )
    .ok_or_else(|| AvailabilityError::InvalidRange(format!("no local midnight on {first_day}")))?;
    let search_end = first_day
        .checked_add_days(Days::new(SEARCH_DAYS))
        .and_then(|d| resolve_local(tz, d.and_time(NaiveTime::default()), DstPolicy::ShiftForward))
        .ok_or_else(|| AvailabilityError::InvalidRange(format!("search from {first_day} overflows")))?;

    let duration = candidate.duration();
    // Round up so every returned slot can hold the whole candidate.
    let minutes = (duration.num_seconds() + 59) / 60;
    let request = SlotRequest::new(minutes, search_start, search_end)
        .with_buffer(buffer_minutes)
        .with_limit(count);

    let suggestions = find_free_slots(busy, window, &request)?
        .into_iter()
        .filter_map(|slot| {
            let end = slot.start.checked_add_signed(duration)?;
            Some(Interval {
                start: slot.start,
                end,
            })
        })
        .collect::<Vec<_>>();

    tracing::debug!(found = suggestions.len(), count, "suggested alternatives");
    Ok(suggestions)
}
