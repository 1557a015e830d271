use chrono::{Local, TimeZone};
use std::fmt::Write;
use termion::{color, style};

use super::{DayReport, Report, ReportSink};

/// The single day panel, the first day of the report.
pub struct TextPanel<Tz: TimeZone = Local> {
    tz: Tz,
    color: bool,
}

impl TextPanel<Local> {
    pub fn new(color: bool) -> Self {
        Self::with_timezone(Local, color)
    }
}

impl<Tz: TimeZone> TextPanel<Tz>
where
    Tz::Offset: std::fmt::Display,
{
    pub fn with_timezone(tz: Tz, color: bool) -> Self {
        Self { tz, color }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            format!("{}{}{}", style::Bold, text, style::Reset)
        } else {
            text.to_string()
        }
    }

    fn highlight(&self, text: &str) -> String {
        if self.color {
            format!(
                "{}{}{}",
                color::Fg(color::LightYellow),
                text,
                color::Fg(color::Reset)
            )
        } else {
            text.to_string()
        }
    }

    fn day(&self, out: &mut String, day: &DayReport) -> std::fmt::Result {
        let obs = &day.observation;
        writeln!(out, "{} {}", obs.phase.emoji(), self.bold(obs.phase.name()))?;
        writeln!(out, "{}", obs.date.format("%A, %B %-d, %Y"))?;
        writeln!(out, "Illumination: {}%", obs.illumination_display())?;
        writeln!(out)?;
        writeln!(out, "{}", self.highlight(obs.phase.ascii_art()))?;
        if let Some(times) = &day.rise_set {
            writeln!(out)?;
            writeln!(out, "Moonrise: {}", times.format_rise(&self.tz))?;
            writeln!(out, "Moonset:  {}", times.format_set(&self.tz))?;
        }
        Ok(())
    }

    fn write(&self, out: &mut String, report: &Report) -> std::fmt::Result {
        if let Some(day) = report.days.first() {
            self.day(out, day)?;
        }
        if let Some(place) = report.place() {
            writeln!(out)?;
            writeln!(out, "Location: {}", place)?;
        }
        if let Some(crime) = &report.crime {
            writeln!(out, "Crime: {}", crime)?;
        }
        Ok(())
    }
}

impl<Tz: TimeZone> ReportSink for TextPanel<Tz>
where
    Tz::Offset: std::fmt::Display,
{
    fn render(&self, report: &Report) -> String {
        let mut out = String::new();
        // writing into a String does not fail
        let _ = self.write(&mut out, report);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;
    use chrono::FixedOffset;

    fn utc_panel(color: bool) -> TextPanel<FixedOffset> {
        TextPanel::with_timezone(FixedOffset::east_opt(0).unwrap(), color)
    }

    #[test]
    fn plain_panel() {
        let text = utc_panel(false).render(&fixtures::report());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "🌔 Waxing Gibbous");
        assert_eq!(lines[1], "Thursday, January 25, 2024");
        assert_eq!(lines[2], "Illumination: 99.2%");
        assert!(text.contains("Moonrise: 21:05"));
        assert!(text.contains("Moonset:  N/A"));
        assert!(text.contains("Location: Boston, Suffolk County, MA"));
        assert!(text.contains("Crime: MA robbery in 2022: 1234"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn rise_set_in_local_time() {
        let panel = TextPanel::with_timezone(FixedOffset::west_opt(5 * 3600).unwrap(), false);
        let text = panel.render(&fixtures::report());
        assert!(text.contains("Moonrise: 16:05"));
    }

    #[test]
    fn colored_panel() {
        let text = utc_panel(true).render(&fixtures::report());
        assert!(text.contains(&format!("{}Waxing Gibbous{}", style::Bold, style::Reset)));
    }

    #[test]
    fn panel_without_optional_parts() {
        let mut report = fixtures::report();
        report.days.remove(0);
        report.location = None;
        report.crime = None;
        let text = utc_panel(false).render(&report);
        assert!(text.starts_with("🌕 Full Moon\n"));
        assert!(!text.contains("Moonrise"));
        assert!(!text.contains("Location"));
        assert!(!text.contains("Crime"));
    }
}
