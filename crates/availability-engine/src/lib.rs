//! # availability-engine
//!
//! Free-slot resolution and conflict detection for meeting scheduling.
//!
//! Busy intervals come from a calendar (already fetched); a working-hours
//! window comes from process-wide settings. Everything here is a pure
//! function of those values, safe to call from concurrent requests.
//!
//! ## Modules
//!
//! - [`interval`] — `Interval` / `BusyInterval` and the sort-and-sweep merge
//! - [`window`] — Working-hours window with timezone and working days
//! - [`resolver`] — Free slots of a requested duration across a date range
//! - [`conflict`] — Overlap checks for a proposed meeting
//! - [`suggest`] — Alternative times for a conflicting meeting
//! - [`calendar`] — Google Calendar payloads → busy intervals
//! - [`recurrence`] — Recurring commitments (RRULE) → busy intervals
//! - [`zones`] — Working-hour overlap across participant timezones
//! - [`localtime`] — Local time → UTC with DST policies, datetime parsing
//! - [`error`] — Error types

pub mod calendar;
pub mod conflict;
pub mod error;
pub mod interval;
pub mod localtime;
pub mod recurrence;
pub mod resolver;
pub mod suggest;
pub mod window;
pub mod zones;

pub use calendar::{parse_google_events, parse_google_freebusy};
pub use conflict::{find_conflicts, has_conflict, Conflict};
pub use error::AvailabilityError;
pub use interval::{merge_busy_intervals, BusyInterval, Interval};
pub use localtime::{parse_datetime, parse_timezone, DstPolicy};
pub use recurrence::{expand_recurring, RecurringCommitment};
pub use resolver::{find_free_slots, first_free_slot, FreeSlot, SlotRequest};
pub use suggest::suggest_alternatives;
pub use window::{WorkingHoursWindow, WEEKDAYS};
pub use zones::{shared_working_hours, SharedHour};
