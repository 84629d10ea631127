//! `unlock-schedule` CLI: build this week's door unlock table from a calendar.
//!
//! ## Usage
//!
//! ```sh
//! # Current week from Google Calendar, written to out/hms_unlock_schedule_template.csv
//! GOOGLE_APPLICATION_CREDENTIALS=/path/to/service-account.json unlock-schedule
//!
//! # A specific week with 15 minutes of padding on both sides
//! unlock-schedule --start-date 2026-01-07 --pad-before 15 --pad-after 15
//!
//! # Offline, from a calendar export, letting padding absorb small differences
//! unlock-schedule --events-file calendar.json --pad-before 10 --optimize -o week.csv
//! ```
//!
//! Settings not given as flags come from the environment (`UNLOCK_TZ`,
//! `UNLOCK_CALENDAR_ID`, `UNLOCK_PAD_BEFORE_MIN`, ...).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use unlock_engine::report::{text_table, write_csv};
use unlock_engine::{
    run, AllDayPolicy, CalendarSource, JsonFileSource, Settings, WeeklySchedule, Window,
};
use unlock_gcal::GoogleCalendarClient;

#[derive(Parser)]
#[command(
    name = "unlock-schedule",
    version,
    about = "Weekly door unlock schedule from calendar events"
)]
struct Cli {
    /// Any date in the target week, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    start_date: Option<String>,

    /// Minutes to unlock before each event
    #[arg(long)]
    pad_before: Option<u32>,

    /// Minutes to stay unlocked after each event
    #[arg(long)]
    pad_after: Option<u32>,

    /// Use the padding as slack to produce fewer rows
    #[arg(long)]
    optimize: bool,

    /// CSV output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Read events from a Google Calendar JSON export instead of the API
    #[arg(long)]
    events_file: Option<PathBuf>,

    /// Calendar to read
    #[arg(long)]
    calendar_id: Option<String>,

    /// What all-day events do: full-unlock or ignore
    #[arg(long, value_parser = parse_all_day)]
    all_day: Option<AllDayPolicy>,

    /// Unlock rows the door controller can hold
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_intervals: Option<u64>,
}

fn parse_all_day(raw: &str) -> std::result::Result<AllDayPolicy, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = apply_flags(
        Settings::from_env().context("Invalid configuration in environment")?,
        &cli,
    )?;
    let window = Window::from_arg(cli.start_date.as_deref(), settings.tz, settings.padding)
        .context("Invalid --start-date")?;

    let source: Box<dyn CalendarSource> = match &cli.events_file {
        Some(path) => Box::new(JsonFileSource::new(path, settings.tz)),
        None => Box::new(
            GoogleCalendarClient::from_credentials(settings.credentials_file.as_deref(), settings.tz)
                .context("Failed to set up Google Calendar access")?,
        ),
    };

    let schedule = run(
        source.as_ref(),
        &settings.calendar_id,
        &window,
        &settings.generate_options(),
    )
    .await
    .context("Failed to build unlock schedule")?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| settings.default_output_path());
    write_output(&output, &schedule)?;
    print_summary(&schedule, &output);

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Flags override the environment.
fn apply_flags(mut settings: Settings, cli: &Cli) -> Result<Settings> {
    if let Some(before) = cli.pad_before {
        settings.padding.before_min = before;
    }
    if let Some(after) = cli.pad_after {
        settings.padding.after_min = after;
    }
    if cli.optimize {
        settings.optimize = true;
    }
    if let Some(id) = &cli.calendar_id {
        settings.calendar_id = id.clone();
    }
    if let Some(policy) = cli.all_day {
        settings.all_day = policy;
    }
    if let Some(max) = cli.max_intervals {
        settings.max_intervals =
            usize::try_from(max).context("--max-intervals is too large for this platform")?;
    }
    Ok(settings)
}

fn write_output(path: &Path, schedule: &WeeklySchedule) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    write_csv(schedule, std::io::BufWriter::new(file))
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

fn print_summary(schedule: &WeeklySchedule, output: &Path) {
    let window = &schedule.window;
    println!(
        "Window:  {} to {} ({})",
        window.start().format("%a %Y-%m-%d %H:%M"),
        window.end().format("%a %Y-%m-%d %H:%M"),
        window.timezone().name()
    );
    println!(
        "Padding: {} min before, {} min after",
        window.padding().before_min,
        window.padding().after_min
    );
    println!(
        "Rows:    {} unlock of {} total ({:?})",
        schedule.unlock_row_count(),
        schedule.rows.len(),
        schedule.mode
    );
    if !schedule.warnings.is_empty() {
        println!("Skipped: {} malformed event(s)", schedule.warnings.len());
    }
    println!("Wrote:   {}", output.display());
    println!();
    print!("{}", text_table(schedule));
}
