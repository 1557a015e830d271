use moonapi::{CrimeSummary, Locality, Location, PhaseObservation, RiseSetTimes};

mod html;
mod table;
mod text;

pub use html::HtmlSink;
pub use table::TableSink;
pub use text::TextPanel;

#[derive(Debug, Clone, PartialEq)]
pub struct DayReport {
    pub observation: PhaseObservation,
    /// Only present when rise / set was requested and a location is known.
    pub rise_set: Option<RiseSetTimes>,
}

/// Everything one run computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub days: Vec<DayReport>,
    pub location: Option<Location>,
    pub locality: Option<Locality>,
    pub crime: Option<CrimeSummary>,
}

impl Report {
    /// Whether any day carries moonrise / moonset times. Sinks leave the rise
    /// and set columns out otherwise.
    pub fn has_rise_set(&self) -> bool {
        self.days.iter().any(|day| day.rise_set.is_some())
    }

    /// The heading used for the location line, the geocoded name or the
    /// locality for unknown ZIP codes.
    pub fn place(&self) -> Option<String> {
        match (&self.location, &self.locality) {
            (Some(location), _) => Some(location.display_name.clone()),
            (None, Some(locality)) => Some(locality.to_string()),
            (None, None) => None,
        }
    }
}

pub trait ReportSink {
    fn render(&self, report: &Report) -> String;
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
