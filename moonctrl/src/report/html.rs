use chrono::{Local, TimeZone};
use std::fmt::Write;

use super::{Report, ReportSink};

const STYLE: &str = "body { font-family: sans-serif; background: #10131a; color: #e8e8e8; } \
table { border-collapse: collapse; } \
td, th { padding: 4px 12px; border-bottom: 1px solid #333; } \
.moon { font-size: 3em; }";

/// Standalone html document of the report.
pub struct HtmlSink<Tz: TimeZone = Local> {
    tz: Tz,
}

impl HtmlSink<Local> {
    pub fn new() -> Self {
        Self::with_timezone(Local)
    }
}

impl Default for HtmlSink<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> HtmlSink<Tz>
where
    Tz::Offset: std::fmt::Display,
{
    pub fn with_timezone(tz: Tz) -> Self {
        Self { tz }
    }

    fn write(&self, out: &mut String, report: &Report) -> std::fmt::Result {
        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html>\n<head>\n<meta charset=\"utf-8\">")?;
        writeln!(out, "<title>Moon phase</title>")?;
        writeln!(out, "<style>{}</style>\n</head>\n<body>", STYLE)?;

        if let Some(first) = report.days.first() {
            let obs = &first.observation;
            writeln!(out, "<div class=\"moon\">{}</div>", obs.phase.emoji())?;
            writeln!(out, "<h1>{}</h1>", escape(obs.phase.name()))?;
        }
        if let Some(place) = report.place() {
            writeln!(out, "<p class=\"location\">{}</p>", escape(&place))?;
        }

        let with_rise_set = report.has_rise_set();

        writeln!(out, "<table>")?;
        write!(out, "<tr><th>Date</th><th>Phase</th><th>Illumination</th>")?;
        if with_rise_set {
            write!(out, "<th>Moonrise</th><th>Moonset</th>")?;
        }
        writeln!(out, "</tr>")?;
        for day in &report.days {
            let obs = &day.observation;
            write!(
                out,
                "<tr><td>{}</td><td>{} {}</td><td>{}%</td>",
                obs.date.format("%Y-%m-%d"),
                obs.phase.emoji(),
                escape(obs.phase.name()),
                obs.illumination_display()
            )?;
            if with_rise_set {
                let (rise, set) = match &day.rise_set {
                    Some(times) => (times.format_rise(&self.tz), times.format_set(&self.tz)),
                    None => (String::new(), String::new()),
                };
                write!(out, "<td>{}</td><td>{}</td>", escape(&rise), escape(&set))?;
            }
            writeln!(out, "</tr>")?;
        }
        writeln!(out, "</table>")?;

        if let Some(crime) = &report.crime {
            writeln!(out, "<p class=\"crime\">{}</p>", escape(&crime.to_string()))?;
        }
        writeln!(out, "</body>\n</html>")
    }
}

impl<Tz: TimeZone> ReportSink for HtmlSink<Tz>
where
    Tz::Offset: std::fmt::Display,
{
    fn render(&self, report: &Report) -> String {
        let mut out = String::new();
        let _ = self.write(&mut out, report);
        out
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
