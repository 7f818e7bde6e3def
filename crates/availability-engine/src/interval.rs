//! Time intervals and the sort-and-sweep merge of busy periods.
//!
//! Calendar APIs make no promise about ordering, so busy intervals are always
//! sorted here before they are merged. Overlapping and touching intervals
//! collapse into one block.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};

/// A half-open time range `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A range during which the user is already committed.
pub type BusyInterval = Interval;

impl Interval {
    /// Build an interval, rejecting empty or inverted ranges.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidRange` if `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(AvailabilityError::InvalidRange(format!(
                "interval start {} is not before end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// True when the interval has positive length.
    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Non-zero intersection. Intervals that only touch do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Intersection with `[start, end)`, or `None` if nothing remains.
    pub fn clip(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Interval> {
        let clipped = Interval {
            start: self.start.max(start),
            end: self.end.min(end),
        };
        clipped.is_valid().then_some(clipped)
    }

    /// Widen the interval by `padding` on both sides, saturating at the
    /// representable bounds.
    pub fn padded(&self, padding: Duration) -> Interval {
        Interval {
            start: self
                .start
                .checked_sub_signed(padding)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end: self
                .end
                .checked_add_signed(padding)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}

/// Merge busy intervals into a sorted, non-overlapping list clipped to
/// `[range_start, range_end)`.
///
/// Each interval is first widened by `padding` on both sides. Degenerate
/// intervals (`start >= end`) are dropped. Intervals that overlap or touch
/// after padding are merged into one block.
pub fn merge_busy_intervals(
    busy: &[BusyInterval],
    padding: Duration,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
) -> Vec<Interval> {
    let mut intervals: Vec<Interval> = busy
        .iter()
        .filter(|b| b.is_valid())
        .filter_map(|b| b.padded(padding).clip(range_start, range_end))
        .collect();

    intervals.sort_by_key(|i| (i.start, i.end));

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}
