//! Detect busy intervals that overlap a proposed meeting.
//!
//! Adjacent intervals (one ends exactly when the other starts) are NOT conflicts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AvailabilityError, Result};
use crate::interval::{BusyInterval, Interval};

/// A busy interval that overlaps the candidate, with the shared portion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub busy: BusyInterval,
    pub overlap_start: DateTime<Utc>,
    pub overlap_end: DateTime<Utc>,
    pub overlap_minutes: i64,
}

/// Every busy interval overlapping `candidate`, in the order given.
///
/// Two intervals overlap when `a.start < b.end && b.start < a.end`.
///
/// # Errors
/// Returns `AvailabilityError::InvalidRange` if `candidate.start >= candidate.end`.
pub fn find_conflicts(candidate: &Interval, busy: &[BusyInterval]) -> Result<Vec<Conflict>> {
    check_candidate(candidate)?;

    let conflicts = busy
        .iter()
        .filter(|b| b.is_valid() && candidate.overlaps(b))
        .map(|b| {
            let overlap_start = candidate.start.max(b.start);
            let overlap_end = candidate.end.min(b.end);
            Conflict {
                busy: *b,
                overlap_start,
                overlap_end,
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            }
        })
        .collect();

    Ok(conflicts)
}

/// True iff `candidate` has a non-zero intersection with some busy interval.
///
/// # Errors
/// Returns `AvailabilityError::InvalidRange` if `candidate.start >= candidate.end`.
pub fn has_conflict(candidate: &Interval, busy: &[BusyInterval]) -> Result<bool> {
    check_candidate(candidate)?;
    Ok(busy.iter().any(|b| b.is_valid() && candidate.overlaps(b)))
}

fn check_candidate(candidate: &Interval) -> Result<()> {
    if candidate.is_valid() {
        Ok(())
    } else {
        Err(AvailabilityError::InvalidRange(format!(
            "candidate start {} is not before end {}",
            candidate.start.to_rfc3339(),
            candidate.end.to_rfc3339()
        )))
    }
}
