//! Google Calendar payloads → busy intervals.
//!
//! Two shapes are understood:
//!
//! - `events.list` responses: `{"items": [...]}` or a bare array of events.
//!   Timed events carry `start.dateTime`; all-day events carry `start.date`
//!   and run from local midnight to local midnight. Cancelled events and
//!   events marked show-as-free (`"transparency": "transparent"`) are skipped.
//! - `freeBusy` responses: `{"calendars": {"<id>": {"busy": [...]}}}`. Busy
//!   blocks from every calendar are combined; calendars that report errors
//!   are skipped.
//!
//! The output is not sorted. The resolver never trusts input order.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{AvailabilityError, Result};
use crate::interval::{BusyInterval, Interval};
use crate::localtime::{parse_datetime, parse_timezone, resolve_local, DstPolicy};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventsPayload {
    Listing {
        #[serde(default)]
        items: Vec<GoogleEvent>,
    },
    Bare(Vec<GoogleEvent>),
}

/// The subset of a Google Calendar event needed for busy computation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub transparency: Option<String>,
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
}

/// Either `dateTime` (timed event) or `date` (all-day event).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl GoogleEvent {
    /// Whether the event blocks time on the calendar.
    pub fn is_busy(&self) -> bool {
        self.status.as_deref() != Some("cancelled")
            && self.transparency.as_deref() != Some("transparent")
    }
}

#[derive(Debug, Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: BTreeMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<FreeBusyBlock>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyBlock {
    start: String,
    end: String,
}

/// Parse an `events.list` response into busy intervals.
///
/// Offset-less `dateTime` values and all-day `date` values are read in the
/// event's own `timeZone`, falling back to `default_tz`.
///
/// # Errors
/// Returns `CalendarPayload` for malformed JSON, `InvalidDatetime` or
/// `InvalidTimezone` for event times that cannot be read.
pub fn parse_google_events(json: &str, default_tz: Tz) -> Result<Vec<BusyInterval>> {
    let events = match serde_json::from_str::<EventsPayload>(json)? {
        EventsPayload::Listing { items } => items,
        EventsPayload::Bare(items) => items,
    };
    events_to_busy(&events, default_tz)
}

/// Convert already-deserialized events into busy intervals.
///
/// # Errors
/// See [`parse_google_events`].
pub fn events_to_busy(events: &[GoogleEvent], default_tz: Tz) -> Result<Vec<BusyInterval>> {
    let mut busy = Vec::with_capacity(events.len());

    for event in events {
        let id = event.id.as_deref().unwrap_or("<no id>");
        if !event.is_busy() {
            tracing::debug!(id, "skipping event that does not block time");
            continue;
        }
        let (Some(start), Some(end)) = (&event.start, &event.end) else {
            tracing::warn!(id, "skipping event without start/end");
            continue;
        };

        let start = event_instant(start, default_tz)?;
        let end = event_instant(end, default_tz)?;
        match Interval::new(start, end) {
            Ok(interval) => busy.push(interval),
            Err(_) => tracing::warn!(id, "skipping event that ends before it starts"),
        }
    }

    Ok(busy)
}

/// Parse a `freeBusy` response into busy intervals across all calendars.
///
/// # Errors
/// Returns `CalendarPayload` for malformed JSON and `InvalidDatetime` for
/// busy blocks whose times are not RFC 3339.
pub fn parse_google_freebusy(json: &str) -> Result<Vec<BusyInterval>> {
    let response: FreeBusyResponse = serde_json::from_str(json)?;
    let mut busy = Vec::new();

    for (calendar_id, calendar) in &response.calendars {
        if !calendar.errors.is_empty() {
            tracing::warn!(
                calendar_id = %calendar_id,
                errors = calendar.errors.len(),
                "skipping calendar that reported errors"
            );
            continue;
        }
        for block in &calendar.busy {
            let start = parse_datetime(&block.start, Tz::UTC)?;
            let end = parse_datetime(&block.end, Tz::UTC)?;
            match Interval::new(start, end) {
                Ok(interval) => busy.push(interval),
                Err(_) => tracing::warn!(calendar_id = %calendar_id, "skipping empty busy block"),
            }
        }
    }

    Ok(busy)
}

fn event_instant(time: &EventTime, default_tz: Tz) -> Result<DateTime<Utc>> {
    let tz = match &time.time_zone {
        Some(name) => parse_timezone(name)?,
        None => default_tz,
    };

    if let Some(date_time) = &time.date_time {
        return parse_datetime(date_time, tz);
    }

    let date = time
        .date
        .as_deref()
        .ok_or_else(|| AvailabilityError::InvalidDatetime("event time has neither dateTime nor date".to_string()))?;
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| AvailabilityError::InvalidDatetime(format!("'{date}': {e}")))?;
    resolve_local(tz, day.and_time(NaiveTime::default()), DstPolicy::ShiftForward)
        .ok_or_else(|| AvailabilityError::InvalidDatetime(format!("no local midnight on {date} in {tz}")))
}
