use chrono::{Local, TimeZone};
use prettytable::{format, Cell, Row, Table};

use super::{Report, ReportSink};

/// One row per day: date, phase, illumination and, when computed, moonrise
/// and moonset.
pub struct TableSink<Tz: TimeZone = Local> {
    tz: Tz,
}

impl TableSink<Local> {
    pub fn new() -> Self {
        Self::with_timezone(Local)
    }
}

impl Default for TableSink<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> TableSink<Tz> {
    pub fn with_timezone(tz: Tz) -> Self {
        Self { tz }
    }
}

fn create_table() -> Table {
    let mut table = Table::new();
    let fmt = format::FormatBuilder::new()
        .padding(1, 1)
        .separator(
            format::LinePosition::Title,
            format::LineSeparator::new('-', '+', '+', '+'),
        )
        .column_separator('|')
        .build();
    table.set_format(fmt);
    table
}

impl<Tz: TimeZone> ReportSink for TableSink<Tz>
where
    Tz::Offset: std::fmt::Display,
{
    fn render(&self, report: &Report) -> String {
        let with_rise_set = report.has_rise_set();

        let mut titles = vec!["date", "phase", "illumination"];
        if with_rise_set {
            titles.extend(["rise", "set"]);
        }
        let mut table = create_table();
        table.set_titles(Row::new(
            titles
                .into_iter()
                .map(|title| Cell::new_align(title, format::Alignment::CENTER))
                .collect(),
        ));

        for day in &report.days {
            let obs = &day.observation;
            let mut cells = vec![
                Cell::new(&obs.date.format("%Y-%m-%d").to_string()),
                Cell::new(&format!("{} {}", obs.phase.emoji(), obs.phase)),
                Cell::new_align(
                    &format!("{}%", obs.illumination_display()),
                    format::Alignment::RIGHT,
                ),
            ];
            if with_rise_set {
                // days without times stay blank, N/A means the moon did not cross
                let (rise, set) = match &day.rise_set {
                    Some(times) => (times.format_rise(&self.tz), times.format_set(&self.tz)),
                    None => (String::new(), String::new()),
                };
                cells.push(Cell::new(&rise));
                cells.push(Cell::new(&set));
            }
            table.add_row(Row::new(cells));
        }

        let mut out = table.to_string();
        if let Some(place) = report.place() {
            out.push_str(&format!("\nLocation: {}\n", place));
        }
        if let Some(crime) = &report.crime {
            out.push_str(&format!("Crime: {}\n", crime));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;
    use chrono::{FixedOffset, Utc};
    use moonapi::NOT_OBSERVED;

    #[test]
    fn one_row_per_day() {
        let sink = TableSink::with_timezone(FixedOffset::east_opt(3600).unwrap());
        let text = sink.render(&fixtures::report());
        let lines: Vec<_> = text.lines().collect();

        assert!(lines[0].contains("date"));
        assert!(lines[0].contains("illumination"));
        assert!(lines[1].contains("-+-"));

        assert!(lines[2].contains("2024-01-25"));
        assert!(lines[2].contains("Waxing Gibbous"));
        assert!(lines[2].contains("99.2%"));
        assert!(lines[2].contains("22:05"));

        assert!(lines[3].contains("2024-01-26"));
        assert!(lines[3].contains("Full Moon"));
        assert_eq!(lines[3].matches(NOT_OBSERVED).count(), 0);
        assert!(lines[2].contains(NOT_OBSERVED));

        assert!(text.contains("Location: Boston, Suffolk County, MA"));
        assert!(text.contains("Crime: MA robbery in 2022: 1234"));
    }

    #[test]
    fn no_rise_set_columns_without_times() {
        let mut report = fixtures::report();
        report.days[0].rise_set = None;
        let text = TableSink::with_timezone(Utc).render(&report);
        let lines: Vec<_> = text.lines().collect();

        assert!(lines[0].contains("illumination"));
        assert!(!lines[0].contains("rise"));
        assert!(!lines[0].contains("set"));
        assert!(!text.contains(NOT_OBSERVED));
        assert!(lines[2].contains("99.2%"));
    }

    #[test]
    fn default_sink_renders() {
        let text = TableSink::default().render(&fixtures::report());
        assert!(text.contains("2024-01-26"));
    }
}
