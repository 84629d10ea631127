//! Rendering of schedules: CSV for the controller, text and HTML tables for
//! people, and a serializable summary for the HTTP API.

use std::fmt::Write as _;
use std::io;

use serde::Serialize;

use crate::builder::ScheduleRow;
use crate::schedule::{BuildMode, ExceptionEntry, WeeklySchedule};
use crate::types::{CellStatus, Weekday};

pub const OPEN_MARK: &str = "✔";
pub const PARTIAL_MARK: &str = "~";

fn mark(status: CellStatus) -> &'static str {
    match status {
        CellStatus::Open => OPEN_MARK,
        CellStatus::Partial => PARTIAL_MARK,
        CellStatus::Closed => "",
    }
}

/// Write `start_time,end_time,Sun..Sat` rows, then the exceptions block if
/// there is one, separated by a blank line.
pub fn write_csv<W: io::Write>(schedule: &WeeklySchedule, mut out: W) -> io::Result<()> {
    {
        let mut writer = csv::Writer::from_writer(&mut out);
        let mut header = vec!["start_time", "end_time"];
        header.extend(Weekday::ALL.iter().map(|d| d.short_name()));
        writer.write_record(&header)?;
        for row in &schedule.rows {
            let mut record = vec![row.start().to_string(), row.end().to_string()];
            record.extend(row.cells.iter().map(|c| mark(*c).to_string()));
            writer.write_record(&record)?;
        }
        writer.flush()?;
    }

    if !schedule.exceptions.is_empty() {
        out.write_all(b"\n")?;
        let mut writer = csv::Writer::from_writer(&mut out);
        writer.write_record(["date", "weekday", "start_time", "end_time", "status"])?;
        for entry in &schedule.exceptions {
            let (start, end) = schedule
                .rows
                .get(entry.row)
                .map(|r| (r.start().to_string(), r.end().to_string()))
                .unwrap_or_default();
            writer.write_record([
                entry.date.to_string(),
                entry.weekday.to_string(),
                start,
                end,
                status_name(entry.status).to_string(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(())
}

pub fn to_csv(schedule: &WeeklySchedule) -> io::Result<String> {
    let mut buf = Vec::new();
    write_csv(schedule, &mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn status_name(status: CellStatus) -> &'static str {
    match status {
        CellStatus::Open => "open",
        CellStatus::Partial => "partial",
        CellStatus::Closed => "closed",
    }
}

/// Fixed-width table for terminals. Unlock rows are numbered; closed rows
/// are listed with `-` so the whole day stays visible.
pub fn text_table(schedule: &WeeklySchedule) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<4} {:<5}  {:<5} ", "#", "start", "end");
    for day in Weekday::ALL {
        let _ = write!(out, " {:<3}", day.short_name());
    }
    out.push('\n');

    let mut slot = 0;
    for row in &schedule.rows {
        let label = if row.is_unlock() {
            slot += 1;
            slot.to_string()
        } else {
            "-".to_string()
        };
        let _ = write!(out, "{:<4} {}  {} ", label, row.start(), row.end());
        for day in Weekday::ALL {
            let cell = match row.status(day) {
                CellStatus::Closed => "-",
                other => mark(other),
            };
            let _ = write!(out, " {:<3}", cell);
        }
        out.push('\n');
    }
    out
}

/// `<table>` fragment for the web page.
pub fn html_table(schedule: &WeeklySchedule) -> String {
    let mut out = String::from("<table class=\"schedule\">\n<thead><tr><th>Start</th><th>End</th>");
    for day in Weekday::ALL {
        let _ = write!(out, "<th>{}</th>", day);
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &schedule.rows {
        let class = if row.is_unlock() { "unlock" } else { "closed" };
        let _ = write!(
            out,
            "<tr class=\"{}\"><td>{}</td><td>{}</td>",
            class,
            row.start(),
            row.end()
        );
        for day in Weekday::ALL {
            let _ = write!(out, "<td>{}</td>", mark(row.status(day)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

/// JSON-friendly view of a [`WeeklySchedule`].
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    pub start_date: String,
    pub window_start: String,
    pub window_end: String,
    pub mode: BuildMode,
    pub unlock_rows: usize,
    pub rows: Vec<ScheduleRow>,
    pub exceptions: Vec<ExceptionEntry>,
    pub warnings: Vec<String>,
}

impl From<&WeeklySchedule> for ScheduleReport {
    fn from(schedule: &WeeklySchedule) -> Self {
        Self {
            start_date: schedule.window.start_date().to_string(),
            window_start: schedule.window.start().to_rfc3339(),
            window_end: schedule.window.end().to_rfc3339(),
            mode: schedule.mode,
            unlock_rows: schedule.unlock_row_count(),
            rows: schedule.rows.clone(),
            exceptions: schedule.exceptions.clone(),
            warnings: schedule.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}
