//! Server-rendered week page.

use std::fmt::Write as _;

use unlock_engine::report::html_table;
use unlock_engine::WeeklySchedule;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem}\
table.schedule{border-collapse:collapse}\
table.schedule td,table.schedule th{border:1px solid #ccc;padding:.25rem .6rem;text-align:center}\
tr.unlock{background:#e8f5e9}tr.closed{color:#999}.error{color:#b00020}";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Full page for `start_date`, with either the schedule or an error message.
pub fn render(start_date: &str, result: Result<&WeeklySchedule, &str>) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>Unlock schedule</title>\
         <style>{}</style></head><body>\n<h1>Door unlock schedule</h1>\n\
         <form method=\"get\" action=\"/\"><label>Week of \
         <input type=\"date\" name=\"start_date\" value=\"{}\"></label> \
         <button type=\"submit\">Show</button></form>\n",
        STYLE,
        escape(start_date)
    );

    match result {
        Ok(schedule) => {
            let window = &schedule.window;
            let _ = write!(
                html,
                "<p>{} to {} ({}), {} unlock rows</p>\n",
                window.start().format("%a %Y-%m-%d %H:%M"),
                window.end().format("%a %Y-%m-%d %H:%M"),
                window.timezone().name(),
                schedule.unlock_row_count()
            );
            html.push_str(&html_table(schedule));
            if !schedule.warnings.is_empty() {
                html.push_str("<h2>Skipped events</h2>\n<ul>\n");
                for warning in &schedule.warnings {
                    let _ = writeln!(html, "<li>{}</li>", escape(&warning.to_string()));
                }
                html.push_str("</ul>\n");
            }
        }
        Err(message) => {
            let _ = writeln!(html, "<p class=\"error\">{}</p>", escape(message));
        }
    }

    html.push_str("</body></html>\n");
    html
}
