//! Error types for availability-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvailabilityError {
    /// A range, candidate or duration that cannot describe a time span.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid working hours: {start:02}:00-{end:02}:00 (hours must be 0-23 and start before end)")]
    InvalidWorkingHours { start: u32, end: u32 },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid RRULE: {0}")]
    InvalidRule(String),

    /// The calendar payload was not valid JSON or did not match the expected shape.
    #[error("Calendar payload error: {0}")]
    CalendarPayload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
