//! `slots` CLI — find free meeting slots and check conflicts from calendar busy data.
//!
//! ## Usage
//!
//! ```sh
//! # Free 30 minute slots on a day, busy intervals from a file
//! slots free --busy busy.json --from 2026-03-16 --to 2026-03-17 --duration 30
//!
//! # Busy data straight from a Google Calendar events.list response on stdin
//! cat events.json | slots free --busy-format google-events --from 2026-03-16
//!
//! # Does a proposed meeting clash with anything?
//! slots conflict --busy busy.json --start 2026-03-16T10:00 --end 2026-03-16T11:00
//!
//! # Alternatives for a clashing meeting
//! slots suggest --busy busy.json --start 2026-03-16T10:00 --end 2026-03-16T11:00
//!
//! # Busy intervals of a recurring standup, ready to feed back into `free`
//! slots expand --rrule "FREQ=DAILY" --dtstart 2026-03-16T09:30:00 --duration 15 \
//!   --from 2026-03-16 --to 2026-03-23
//!
//! # Hours that suit participants in several timezones
//! slots overlap --tz Europe/London --tz Asia/Kolkata --date 2026-03-16
//!
//! # Effective configuration
//! slots config
//! ```

mod settings;

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use availability_engine::{
    expand_recurring, find_conflicts, find_free_slots, parse_datetime, parse_google_events,
    parse_google_freebusy, shared_working_hours, suggest_alternatives,
    BusyInterval, FreeSlot, Interval, RecurringCommitment, SlotRequest, WorkingHoursWindow,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Free-slot finder and conflict checker for calendar busy data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML); defaults to ./slots.toml or ./config/slots.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log more (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Where busy intervals are read from.
#[derive(clap::Args)]
struct BusyArgs {
    /// Busy data file (reads from stdin if omitted)
    #[arg(short, long)]
    busy: Option<PathBuf>,

    /// Shape of the busy data
    #[arg(long, value_enum, default_value_t = BusyFormat::Intervals)]
    busy_format: BusyFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum BusyFormat {
    /// JSON array of `{"start": ..., "end": ...}` RFC 3339 pairs
    Intervals,
    /// Google Calendar events.list response
    GoogleEvents,
    /// Google Calendar freeBusy response
    GoogleFreebusy,
}

#[derive(Subcommand)]
enum Commands {
    /// List free slots inside working hours
    Free {
        #[command(flatten)]
        busy: BusyArgs,
        /// Start of the search range (defaults to now)
        #[arg(long)]
        from: Option<String>,
        /// End of the search range (defaults to seven days after --from)
        #[arg(long)]
        to: Option<String>,
        /// Minimum slot length in minutes
        #[arg(short, long)]
        duration: Option<i64>,
        /// Minutes kept clear around each busy interval
        #[arg(long)]
        buffer: Option<i64>,
        /// Maximum number of slots (0 = no limit)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Check a proposed meeting against busy intervals
    Conflict {
        #[command(flatten)]
        busy: BusyArgs,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Suggest alternative times for a proposed meeting
    Suggest {
        #[command(flatten)]
        busy: BusyArgs,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Number of alternatives
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Minutes kept clear around each busy interval
        #[arg(long)]
        buffer: Option<i64>,
    },
    /// Expand a recurring commitment into busy intervals
    Expand {
        /// RFC 5545 RRULE body, e.g. FREQ=WEEKLY;BYDAY=MO,WE
        #[arg(long)]
        rrule: String,
        /// Local start of the first instance, e.g. 2026-03-16T09:30:00
        #[arg(long)]
        dtstart: String,
        /// Length of each instance in minutes
        #[arg(short, long)]
        duration: u32,
        /// Timezone of --dtstart (defaults to the configured timezone)
        #[arg(long)]
        tz: Option<String>,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// UTC hours that fall inside working hours for every timezone
    Overlap {
        /// Participant timezone (repeatable)
        #[arg(long = "tz", required = true)]
        timezones: Vec<String>,
        /// Day to check, YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    /// Print the effective settings
    Config,
}

#[derive(Serialize)]
struct SlotView {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    duration_minutes: i64,
    start_local: String,
    end_local: String,
}

impl SlotView {
    fn new(slot: &FreeSlot, tz: Tz) -> Self {
        Self {
            start: slot.start,
            end: slot.end,
            duration_minutes: slot.duration_minutes,
            start_local: format_local(slot.start, tz, "%A, %B %d at %I:%M %p"),
            end_local: format_local(slot.end, tz, "%I:%M %p"),
        }
    }
}

#[derive(Serialize)]
struct FreeReport {
    timezone: String,
    duration_requested: i64,
    buffer_minutes: i64,
    slots: Vec<SlotView>,
}

#[derive(Serialize)]
struct ConflictReport {
    conflict: bool,
    conflicts: Vec<availability_engine::Conflict>,
}

#[derive(Serialize)]
struct SuggestReport {
    original: Interval,
    alternatives: Vec<SlotView>,
}

#[derive(Serialize)]
struct ConfigReport {
    working_hours: availability_engine::window::WindowSummary,
    default_duration_minutes: i64,
    buffer_minutes: i64,
    max_slots: usize,
    max_alternatives: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    let window = settings.window().context("Invalid working-hours settings")?;
    let tz = window.timezone();

    match cli.command {
        Commands::Free {
            busy,
            from,
            to,
            duration,
            buffer,
            limit,
        } => {
            let busy = read_busy(&busy, tz)?;
            let range_start = match from.as_deref() {
                Some(s) => parse_arg(s, tz, "--from")?,
                None => Utc::now(),
            };
            let range_end = match to.as_deref() {
                Some(s) => parse_arg(s, tz, "--to")?,
                None => range_start
                    .checked_add_signed(Duration::days(7))
                    .context("--from is too far in the future")?,
            };

            let duration = duration.unwrap_or(settings.scheduling.default_duration_minutes);
            let buffer = buffer.unwrap_or(settings.scheduling.buffer_minutes);
            let mut request =
                SlotRequest::new(duration, range_start, range_end).with_buffer(buffer);
            let limit = limit.unwrap_or(settings.scheduling.max_slots);
            if limit > 0 {
                request = request.with_limit(limit);
            }

            let slots = find_free_slots(&busy, &window, &request)
                .context("Failed to resolve free slots")?;
            print_json(&FreeReport {
                timezone: tz.name().to_string(),
                duration_requested: duration,
                buffer_minutes: buffer,
                slots: slots.iter().map(|s| SlotView::new(s, tz)).collect(),
            })?;
        }
        Commands::Conflict { busy, start, end } => {
            let busy = read_busy(&busy, tz)?;
            let candidate = candidate(&start, &end, tz)?;
            let conflicts =
                find_conflicts(&candidate, &busy).context("Failed to check conflicts")?;
            print_json(&ConflictReport {
                conflict: !conflicts.is_empty(),
                conflicts,
            })?;
        }
        Commands::Suggest {
            busy,
            start,
            end,
            count,
            buffer,
        } => {
            let busy = read_busy(&busy, tz)?;
            let candidate = candidate(&start, &end, tz)?;
            let count = count.unwrap_or(settings.scheduling.max_alternatives);
            let buffer = buffer.unwrap_or(settings.scheduling.buffer_minutes);
            let alternatives = suggest_alternatives(&candidate, &busy, &window, count, buffer)
                .context("Failed to suggest alternatives")?;
            print_json(&SuggestReport {
                original: candidate,
                alternatives: alternatives
                    .iter()
                    .map(|alt| {
                        let slot = FreeSlot {
                            start: alt.start,
                            end: alt.end,
                            duration_minutes: alt.duration_minutes(),
                        };
                        SlotView::new(&slot, tz)
                    })
                    .collect(),
            })?;
        }
        Commands::Expand {
            rrule,
            dtstart,
            duration,
            tz: rule_tz,
            from,
            to,
        } => {
            let commitment = RecurringCommitment {
                rrule,
                dtstart,
                duration_minutes: duration,
                timezone: rule_tz.unwrap_or_else(|| tz.name().to_string()),
            };
            let range_start = parse_arg(&from, tz, "--from")?;
            let range_end = parse_arg(&to, tz, "--to")?;
            let busy = expand_recurring(&commitment, range_start, range_end)
                .context("Failed to expand recurring commitment")?;
            print_json(&busy)?;
        }
        Commands::Overlap { timezones, date } => {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("Invalid --date '{date}', expected YYYY-MM-DD"))?;
            let names: Vec<&str> = timezones.iter().map(String::as_str).collect();
            let shared = shared_working_hours(
                &names,
                settings.working_hours.start,
                settings.working_hours.end,
                date,
            )
            .context("Failed to compute shared working hours")?;
            print_json(&shared)?;
        }
        Commands::Config => {
            print_json(&config_report(&settings, &window))?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn config_report(settings: &Settings, window: &WorkingHoursWindow) -> ConfigReport {
    ConfigReport {
        working_hours: window.summary(),
        default_duration_minutes: settings.scheduling.default_duration_minutes,
        buffer_minutes: settings.scheduling.buffer_minutes,
        max_slots: settings.scheduling.max_slots,
        max_alternatives: settings.scheduling.max_alternatives,
    }
}

fn parse_arg(value: &str, tz: Tz, flag: &str) -> Result<DateTime<Utc>> {
    parse_datetime(value, tz).with_context(|| format!("Invalid {flag} '{value}'"))
}

fn candidate(start: &str, end: &str, tz: Tz) -> Result<Interval> {
    let start = parse_arg(start, tz, "--start")?;
    let end = parse_arg(end, tz, "--end")?;
    Interval::new(start, end).context("Invalid meeting time")
}

fn read_busy(args: &BusyArgs, tz: Tz) -> Result<Vec<BusyInterval>> {
    let raw = read_input(args.busy.as_ref())?;
    if raw.trim().is_empty() {
        tracing::debug!("no busy data supplied");
        return Ok(Vec::new());
    }

    let busy = match args.busy_format {
        BusyFormat::Intervals => {
            serde_json::from_str::<Vec<BusyInterval>>(&raw).context("Invalid busy intervals JSON")?
        }
        BusyFormat::GoogleEvents => {
            parse_google_events(&raw, tz).context("Invalid Google Calendar events payload")?
        }
        BusyFormat::GoogleFreebusy => {
            parse_google_freebusy(&raw).context("Invalid Google Calendar freeBusy payload")?
        }
    };
    tracing::debug!(count = busy.len(), "read busy intervals");
    Ok(busy)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn format_local(at: DateTime<Utc>, tz: Tz, pattern: &str) -> String {
    at.with_timezone(&tz).format(pattern).to_string()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
