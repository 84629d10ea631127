//! Runtime settings.
//!
//! Settings are an explicit value handed to each computation. They are read
//! from environment variables through a lookup function so tests and
//! embedders can supply their own.

use std::path::PathBuf;

use chrono_tz::Tz;

use crate::error::{Result, ScheduleError};
use crate::event::AllDayPolicy;
use crate::schedule::{GenerateOptions, DEFAULT_MAX_INTERVALS};
use crate::window::{parse_timezone, Padding};

pub const ENV_TZ: &str = "UNLOCK_TZ";
pub const ENV_CALENDAR_ID: &str = "UNLOCK_CALENDAR_ID";
pub const ENV_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const ENV_PAD_BEFORE: &str = "UNLOCK_PAD_BEFORE_MIN";
pub const ENV_PAD_AFTER: &str = "UNLOCK_PAD_AFTER_MIN";
pub const ENV_OPTIMIZE: &str = "UNLOCK_OPTIMIZE";
pub const ENV_ALL_DAY: &str = "UNLOCK_ALL_DAY_POLICY";
pub const ENV_MAX_INTERVALS: &str = "UNLOCK_MAX_INTERVALS";
pub const ENV_OUTPUT_DIR: &str = "UNLOCK_OUTPUT_DIR";
pub const ENV_OUTPUT_CSV: &str = "UNLOCK_OUTPUT_CSV";

pub const DEFAULT_TZ: &str = "America/New_York";
pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_OUTPUT_DIR: &str = "out";
pub const DEFAULT_OUTPUT_CSV: &str = "hms_unlock_schedule_template.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub tz: Tz,
    pub calendar_id: String,
    pub credentials_file: Option<PathBuf>,
    pub padding: Padding,
    pub optimize: bool,
    pub all_day: AllDayPolicy,
    pub max_intervals: usize,
    pub output_dir: PathBuf,
    pub output_csv: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tz: chrono_tz::America::New_York,
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            credentials_file: None,
            padding: Padding::NONE,
            optimize: false,
            all_day: AllDayPolicy::default(),
            max_intervals: DEFAULT_MAX_INTERVALS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_csv: DEFAULT_OUTPUT_CSV.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(tz) = get(ENV_TZ) {
            settings.tz = parse_timezone(&tz)?;
        }
        if let Some(id) = get(ENV_CALENDAR_ID) {
            settings.calendar_id = id.trim().to_string();
        }
        settings.credentials_file = get(ENV_CREDENTIALS).map(PathBuf::from);
        if let Some(v) = get(ENV_PAD_BEFORE) {
            settings.padding.before_min = parse_number(ENV_PAD_BEFORE, &v)?;
        }
        if let Some(v) = get(ENV_PAD_AFTER) {
            settings.padding.after_min = parse_number(ENV_PAD_AFTER, &v)?;
        }
        if let Some(v) = get(ENV_OPTIMIZE) {
            settings.optimize = parse_flag(&v);
        }
        if let Some(v) = get(ENV_ALL_DAY) {
            settings.all_day = v
                .parse()
                .map_err(|e| ScheduleError::InvalidConfig(format!("{}: {}", ENV_ALL_DAY, e)))?;
        }
        if let Some(v) = get(ENV_MAX_INTERVALS) {
            let max: usize = parse_number(ENV_MAX_INTERVALS, &v)?;
            if max == 0 {
                return Err(ScheduleError::InvalidConfig(format!(
                    "{} must be at least 1",
                    ENV_MAX_INTERVALS
                )));
            }
            settings.max_intervals = max;
        }
        if let Some(v) = get(ENV_OUTPUT_DIR) {
            settings.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_OUTPUT_CSV) {
            settings.output_csv = v;
        }
        Ok(settings)
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            optimize: self.optimize,
            all_day: self.all_day,
            max_intervals: self.max_intervals,
        }
    }

    /// `<output_dir>/<output_csv>`.
    pub fn default_output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_csv)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        ScheduleError::InvalidConfig(format!("{} must be a non-negative integer, got '{}'", key, raw))
    })
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
