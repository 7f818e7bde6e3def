//! Free-slot resolution over busy intervals and a working-hours window.
//!
//! Busy intervals are merged once with an explicit sort-and-sweep, then every
//! local calendar day touching the requested range is intersected with the
//! working window and swept for gaps long enough for the requested duration.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};
use crate::interval::{merge_busy_intervals, BusyInterval, Interval};
use crate::window::WorkingHoursWindow;

/// A request for free slots of at least `duration_minutes` within a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequest {
    pub duration_minutes: i64,
    pub range_start: DateTime<Utc>,
    pub range_end: DateTime<Utc>,
    /// Minutes of padding kept clear on both sides of every busy interval.
    #[serde(default)]
    pub buffer_minutes: i64,
    /// Cap on the number of slots returned.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SlotRequest {
    pub fn new(duration_minutes: i64, range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> Self {
        Self {
            duration_minutes,
            range_start,
            range_end,
            buffer_minutes: 0,
            limit: None,
        }
    }

    pub fn with_buffer(mut self, buffer_minutes: i64) -> Self {
        self.buffer_minutes = buffer_minutes;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// # Errors
    /// Returns `AvailabilityError::InvalidRange` when the range is empty or
    /// inverted, the duration is not positive, or the buffer is negative.
    /// Durations and buffers too large to represent are rejected the same way.
    pub fn validate(&self) -> Result<()> {
        self.spans().map(|_| ())
    }

    /// Minimum slot length and busy padding as durations.
    fn spans(&self) -> Result<(Duration, Duration)> {
        if self.range_start >= self.range_end {
            return Err(AvailabilityError::InvalidRange(format!(
                "range start {} is not before range end {}",
                self.range_start.to_rfc3339(),
                self.range_end.to_rfc3339()
            )));
        }
        if self.duration_minutes <= 0 {
            return Err(AvailabilityError::InvalidRange(format!(
                "duration must be positive, got {} minutes",
                self.duration_minutes
            )));
        }
        if self.buffer_minutes < 0 {
            return Err(AvailabilityError::InvalidRange(format!(
                "buffer must not be negative, got {} minutes",
                self.buffer_minutes
            )));
        }
        let min_len = Duration::try_minutes(self.duration_minutes).ok_or_else(|| {
            AvailabilityError::InvalidRange(format!(
                "duration of {} minutes is out of range",
                self.duration_minutes
            ))
        })?;
        let padding = Duration::try_minutes(self.buffer_minutes).ok_or_else(|| {
            AvailabilityError::InvalidRange(format!(
                "buffer of {} minutes is out of range",
                self.buffer_minutes
            ))
        })?;
        Ok((min_len, padding))
    }
}

/// A free time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl FreeSlot {
    fn from_interval(interval: Interval) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
            duration_minutes: interval.duration_minutes(),
        }
    }

    pub fn as_interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}

/// Find free slots of at least `request.duration_minutes` inside the working
/// hours of every day in `[range_start, range_end)`.
///
/// `busy` may be empty or unsorted. Overlapping and touching busy intervals
/// are merged, so no gap is reported between them. Busy intervals reaching
/// past the range are clipped to it. Slots come back in chronological order.
///
/// # Errors
/// Returns `AvailabilityError::InvalidRange` if the request fails
/// [`SlotRequest::validate`].
pub fn find_free_slots(
    busy: &[BusyInterval],
    window: &WorkingHoursWindow,
    request: &SlotRequest,
) -> Result<Vec<FreeSlot>> {
    let (min_len, padding) = request.spans()?;

    let merged = merge_busy_intervals(
        busy,
        padding,
        request.range_start,
        request.range_end,
    );
    tracing::debug!(
        busy = busy.len(),
        merged = merged.len(),
        duration_minutes = request.duration_minutes,
        "resolving free slots"
    );

    let tz = window.timezone();
    let mut date = request.range_start.with_timezone(&tz).date_naive();
    let last_date = request.range_end.with_timezone(&tz).date_naive();

    let mut slots = Vec::new();
    while date <= last_date {
        let day = window
            .day_bounds(date)
            .and_then(|bounds| bounds.clip(request.range_start, request.range_end));

        if let Some(day) = day {
            let before = slots.len();
            sweep_day(day, &merged, min_len, &mut slots);
            tracing::trace!(%date, found = slots.len() - before, "scanned working day");
        }

        if let Some(limit) = request.limit {
            if slots.len() >= limit {
                slots.truncate(limit);
                break;
            }
        }

        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    Ok(slots)
}

/// Convenience wrapper returning only the earliest qualifying slot.
///
/// # Errors
/// Same as [`find_free_slots`].
pub fn first_free_slot(
    busy: &[BusyInterval],
    window: &WorkingHoursWindow,
    request: &SlotRequest,
) -> Result<Option<FreeSlot>> {
    let request = request.clone().with_limit(1);
    Ok(find_free_slots(busy, window, &request)?.into_iter().next())
}

/// Emit the gaps of `day` not covered by `merged` that are at least `min_len` long.
///
/// `merged` is sorted and non-overlapping, so its ends are sorted as well and
/// the first relevant block can be found by binary search.
fn sweep_day(day: Interval, merged: &[Interval], min_len: Duration, out: &mut Vec<FreeSlot>) {
    let first = merged.partition_point(|b| b.end <= day.start);
    let mut cursor = day.start;

    for block in merged[first..].iter().take_while(|b| b.start < day.end) {
        if cursor < block.start {
            push_if_long_enough(cursor, block.start, min_len, out);
        }
        cursor = cursor.max(block.end);
    }

    if cursor < day.end {
        push_if_long_enough(cursor, day.end, min_len, out);
    }
}

fn push_if_long_enough(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_len: Duration,
    out: &mut Vec<FreeSlot>,
) {
    if end - start >= min_len {
        out.push(FreeSlot::from_interval(Interval { start, end }));
    }
}
