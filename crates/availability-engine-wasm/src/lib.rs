//! WASM bindings for availability-engine.
//!
//! Exposes free-slot resolution, conflict checks, alternative suggestions and
//! Google Calendar payload parsing to JavaScript via `wasm-bindgen`. Complex
//! values cross the boundary as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p availability-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/availability-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/availability_engine_wasm.wasm
//! ```
//!
//! ## Window JSON
//!
//! ```json
//! {"start_hour": 9, "end_hour": 17, "timezone": "Asia/Kolkata",
//!  "working_days": ["Mon", "Tue", "Wed", "Thu", "Fri"]}
//! ```
//!
//! `working_days` may be omitted to allow every day.

use std::str::FromStr;

use availability_engine::{BusyInterval, FreeSlot, Interval, SlotRequest, WorkingHoursWindow};
use chrono::{DateTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WindowInput {
    start_hour: u32,
    end_hour: u32,
    timezone: String,
    #[serde(default)]
    working_days: Option<Vec<String>>,
}

impl WindowInput {
    fn build(&self) -> Result<WorkingHoursWindow, String> {
        let days = match &self.working_days {
            Some(names) => names
                .iter()
                .map(|d| Weekday::from_str(d).map_err(|_| format!("Unknown weekday: '{d}'")))
                .collect::<Result<Vec<_>, _>>()?,
            None => availability_engine::window::ALL_DAYS.to_vec(),
        };
        WorkingHoursWindow::from_parts(self.start_hour, self.end_hour, &self.timezone, &days)
            .map_err(|e| e.to_string())
    }
}

#[derive(Serialize)]
struct SlotDto {
    start: String,
    end: String,
    duration_minutes: i64,
}

impl From<&FreeSlot> for SlotDto {
    fn from(s: &FreeSlot) -> Self {
        Self {
            start: s.start.to_rfc3339(),
            end: s.end.to_rfc3339(),
            duration_minutes: s.duration_minutes,
        }
    }
}

impl From<&Interval> for SlotDto {
    fn from(i: &Interval) -> Self {
        Self {
            start: i.start.to_rfc3339(),
            end: i.end.to_rfc3339(),
            duration_minutes: i.duration_minutes(),
        }
    }
}

#[derive(Serialize)]
struct ConflictDto {
    busy: SlotDto,
    overlap_start: String,
    overlap_end: String,
    overlap_minutes: i64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_window(json: &str) -> Result<WorkingHoursWindow, String> {
    let input: WindowInput =
        serde_json::from_str(json).map_err(|e| format!("Invalid window JSON: {e}"))?;
    input.build()
}

fn parse_busy(json: &str) -> Result<Vec<BusyInterval>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid busy intervals JSON: {e}"))
}

fn parse_instant(s: &str, tz: Tz) -> Result<DateTime<Utc>, String> {
    availability_engine::parse_datetime(s, tz).map_err(|e| e.to_string())
}

fn parse_candidate(start: &str, end: &str, tz: Tz) -> Result<Interval, String> {
    let start = parse_instant(start, tz)?;
    let end = parse_instant(end, tz)?;
    Interval::new(start, end).map_err(|e| e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {e}"))
}

fn js_err(message: String) -> JsValue {
    JsValue::from_str(&message)
}

// ---------------------------------------------------------------------------
// Implementations (plain Rust, testable off wasm32)
// ---------------------------------------------------------------------------

/// Window and slot request shared by `findFreeSlots` and `firstFreeSlot`.
fn slot_request(
    window_json: &str,
    range_start: &str,
    range_end: &str,
    duration_minutes: i64,
    buffer_minutes: i64,
) -> Result<(WorkingHoursWindow, SlotRequest), String> {
    let window = parse_window(window_json)?;
    let tz = window.timezone();
    let request = SlotRequest::new(
        duration_minutes,
        parse_instant(range_start, tz)?,
        parse_instant(range_end, tz)?,
    )
    .with_buffer(buffer_minutes);
    Ok((window, request))
}

/// A `limit` of 0 means no limit.
fn free_slots_impl(
    busy_json: &str,
    window_json: &str,
    range_start: &str,
    range_end: &str,
    duration_minutes: i64,
    buffer_minutes: i64,
    limit: Option<usize>,
) -> Result<String, String> {
    let (window, mut request) =
        slot_request(window_json, range_start, range_end, duration_minutes, buffer_minutes)?;
    let busy = parse_busy(busy_json)?;
    if let Some(limit) = limit.filter(|&l| l > 0) {
        request = request.with_limit(limit);
    }

    let slots = availability_engine::find_free_slots(&busy, &window, &request)
        .map_err(|e| e.to_string())?;
    to_json(&slots.iter().map(SlotDto::from).collect::<Vec<_>>())
}

fn first_free_impl(
    busy_json: &str,
    window_json: &str,
    range_start: &str,
    range_end: &str,
    duration_minutes: i64,
    buffer_minutes: i64,
) -> Result<String, String> {
    let (window, request) =
        slot_request(window_json, range_start, range_end, duration_minutes, buffer_minutes)?;
    let busy = parse_busy(busy_json)?;
    let slot = availability_engine::first_free_slot(&busy, &window, &request)
        .map_err(|e| e.to_string())?;
    to_json(&slot.as_ref().map(SlotDto::from))
}

fn conflicts_impl(
    busy_json: &str,
    start: &str,
    end: &str,
    timezone: &str,
) -> Result<Vec<availability_engine::Conflict>, String> {
    let tz = availability_engine::parse_timezone(timezone).map_err(|e| e.to_string())?;
    let candidate = parse_candidate(start, end, tz)?;
    let busy = parse_busy(busy_json)?;
    availability_engine::find_conflicts(&candidate, &busy).map_err(|e| e.to_string())
}

fn suggest_impl(
    busy_json: &str,
    window_json: &str,
    start: &str,
    end: &str,
    count: usize,
    buffer_minutes: i64,
) -> Result<String, String> {
    let window = parse_window(window_json)?;
    let candidate = parse_candidate(start, end, window.timezone())?;
    let busy = parse_busy(busy_json)?;
    let alternatives =
        availability_engine::suggest_alternatives(&candidate, &busy, &window, count, buffer_minutes)
            .map_err(|e| e.to_string())?;
    to_json(&alternatives.iter().map(SlotDto::from).collect::<Vec<_>>())
}

fn google_events_impl(events_json: &str, timezone: &str) -> Result<String, String> {
    let tz = availability_engine::parse_timezone(timezone).map_err(|e| e.to_string())?;
    let busy =
        availability_engine::parse_google_events(events_json, tz).map_err(|e| e.to_string())?;
    to_json(&busy)
}

fn google_freebusy_impl(freebusy_json: &str) -> Result<String, String> {
    let busy =
        availability_engine::parse_google_freebusy(freebusy_json).map_err(|e| e.to_string())?;
    to_json(&busy)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Find free slots inside working hours.
///
/// `busy_json` is a JSON array of `{start, end}` RFC 3339 pairs and
/// `window_json` a working-hours window (see the crate docs). Range bounds may
/// be RFC 3339 or naive local times in the window's timezone. A `limit` of 0
/// means no limit. Returns a JSON array of `{start, end, duration_minutes}`
/// objects.
#[wasm_bindgen(js_name = "findFreeSlots")]
pub fn find_free_slots(
    busy_json: &str,
    window_json: &str,
    range_start: &str,
    range_end: &str,
    duration_minutes: u32,
    buffer_minutes: u32,
    limit: Option<u32>,
) -> Result<String, JsValue> {
    free_slots_impl(
        busy_json,
        window_json,
        range_start,
        range_end,
        i64::from(duration_minutes),
        i64::from(buffer_minutes),
        limit.map(|l| l as usize),
    )
    .map_err(js_err)
}

/// Earliest free slot as a `{start, end, duration_minutes}` object, or `null`
/// when none fits.
#[wasm_bindgen(js_name = "firstFreeSlot")]
pub fn first_free_slot(
    busy_json: &str,
    window_json: &str,
    range_start: &str,
    range_end: &str,
    duration_minutes: u32,
    buffer_minutes: u32,
) -> Result<String, JsValue> {
    first_free_impl(
        busy_json,
        window_json,
        range_start,
        range_end,
        i64::from(duration_minutes),
        i64::from(buffer_minutes),
    )
    .map_err(js_err)
}

/// Whether a proposed meeting overlaps any busy interval. Touching does not count.
#[wasm_bindgen(js_name = "hasConflict")]
pub fn has_conflict(
    busy_json: &str,
    start: &str,
    end: &str,
    timezone: &str,
) -> Result<bool, JsValue> {
    conflicts_impl(busy_json, start, end, timezone)
        .map(|c| !c.is_empty())
        .map_err(js_err)
}

/// Busy intervals overlapping a proposed meeting, with the overlap of each.
#[wasm_bindgen(js_name = "findConflicts")]
pub fn find_conflicts(
    busy_json: &str,
    start: &str,
    end: &str,
    timezone: &str,
) -> Result<String, JsValue> {
    let conflicts = conflicts_impl(busy_json, start, end, timezone).map_err(js_err)?;
    let dtos: Vec<ConflictDto> = conflicts
        .iter()
        .map(|c| ConflictDto {
            busy: SlotDto::from(&c.busy),
            overlap_start: c.overlap_start.to_rfc3339(),
            overlap_end: c.overlap_end.to_rfc3339(),
            overlap_minutes: c.overlap_minutes,
        })
        .collect();
    to_json(&dtos).map_err(js_err)
}

/// Up to `count` conflict-free alternatives of the same length as the proposed meeting.
#[wasm_bindgen(js_name = "suggestAlternatives")]
pub fn suggest_alternatives(
    busy_json: &str,
    window_json: &str,
    start: &str,
    end: &str,
    count: u32,
    buffer_minutes: u32,
) -> Result<String, JsValue> {
    suggest_impl(
        busy_json,
        window_json,
        start,
        end,
        count as usize,
        i64::from(buffer_minutes),
    )
    .map_err(js_err)
}

/// Busy intervals from a Google Calendar events.list response.
#[wasm_bindgen(js_name = "parseGoogleEvents")]
pub fn parse_google_events(events_json: &str, timezone: &str) -> Result<String, JsValue> {
    google_events_impl(events_json, timezone).map_err(js_err)
}

/// Busy intervals from a Google Calendar freeBusy response.
#[wasm_bindgen(js_name = "parseGoogleFreeBusy")]
pub fn parse_google_freebusy(freebusy_json: &str) -> Result<String, JsValue> {
    google_freebusy_impl(freebusy_json).map_err(js_err)
}
