use chrono::prelude::*;
use moonapi::{
    CrimeClient, CrimeSummary, Ephemeris, Geocoder, Locality, Location, Observer, OffenseCode,
    PhaseClassifier, RiseSetCalculator,
};

use crate::report::{DayReport, Report};

/// Source of crime statistics, the seam between the pipeline and the FBI api.
pub trait CrimeSource {
    fn summary(&self, state: &str, offense: OffenseCode, year: i32) -> moonapi::Result<CrimeSummary>;
}

impl CrimeSource for CrimeClient {
    fn summary(&self, state: &str, offense: OffenseCode, year: i32) -> moonapi::Result<CrimeSummary> {
        CrimeClient::summary(self, state, offense, year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrimeOptions {
    pub offense: OffenseCode,
    pub year: i32,
}

/// What a single run should compute.
#[derive(Debug, Clone)]
pub struct Options {
    pub start: DateTime<Utc>,
    pub days: u32,
    pub zip: Option<String>,
    /// Explicit coordinates, win over the ones of the ZIP code.
    pub coordinates: Option<(f64, f64)>,
    pub rise_set: bool,
    pub crime: Option<CrimeOptions>,
}

impl Options {
    pub fn new(start: DateTime<Utc>, days: u32) -> Self {
        Self {
            start,
            days,
            zip: None,
            coordinates: None,
            rise_set: false,
            crime: None,
        }
    }
}

/// classifier -> location -> rise / set -> crime statistics
pub struct Pipeline<E> {
    classifier: PhaseClassifier<E>,
    rise_set: RiseSetCalculator<E>,
    geocoder: Option<Box<dyn Geocoder>>,
    crime: Option<Box<dyn CrimeSource>>,
}

impl<E: Ephemeris + Clone> Pipeline<E> {
    pub fn new(ephemeris: E) -> Self {
        Self {
            classifier: PhaseClassifier::new(ephemeris.clone()),
            rise_set: RiseSetCalculator::new(ephemeris),
            geocoder: None,
            crime: None,
        }
    }

    pub fn with_geocoder(mut self, geocoder: impl Geocoder + 'static) -> Self {
        self.geocoder = Some(Box::new(geocoder));
        self
    }

    pub fn with_crime_source(mut self, source: impl CrimeSource + 'static) -> Self {
        self.crime = Some(Box::new(source));
        self
    }

    /// Only an out of range date range fails the run. Location and crime
    /// lookups degrade to missing information.
    pub fn run(&self, options: &Options) -> anyhow::Result<Report> {
        let observations = self.classifier.observe_days(options.start, options.days)?;

        let locality = options.zip.as_deref().and_then(|zip| self.locality(zip));

        let location = match (options.coordinates, &locality) {
            (Some((latitude, longitude)), _) => Some(Location::new(
                latitude,
                longitude,
                format!("{:.3}, {:.3}", latitude, longitude),
            )),
            (None, Some(locality)) => locality.location.clone(),
            (None, None) => None,
        };

        let observer = match (&location, options.rise_set) {
            (Some(location), true) => Some(Observer::from(location)),
            (None, true) => {
                warn!("no location for moonrise / moonset, use --zip or --latitude / --longitude");
                None
            }
            _ => None,
        };

        let days = observations
            .into_iter()
            .map(|observation| {
                let rise_set = observer
                    .as_ref()
                    .map(|observer| self.rise_set.compute(observer, observation.instant));
                DayReport {
                    observation,
                    rise_set,
                }
            })
            .collect();

        let crime = match (&options.crime, &locality) {
            (Some(crime), Some(locality)) => self.crime_summary(locality, crime),
            (Some(_), None) => {
                info!("skipping crime statistics, no ZIP code given");
                None
            }
            _ => None,
        };

        Ok(Report {
            days,
            location,
            locality,
            crime,
        })
    }

    fn locality(&self, zip: &str) -> Option<Locality> {
        let geocoder = match &self.geocoder {
            Some(geocoder) => geocoder,
            None => {
                warn!("no geocoder configured, ignoring ZIP code {}", zip);
                return None;
            }
        };
        match geocoder.resolve(zip) {
            Ok(locality) => {
                debug!("resolved {} to {:?}", zip, locality);
                Some(locality)
            }
            Err(err) => {
                warn!("cannot resolve ZIP code {}: {}", zip, err);
                None
            }
        }
    }

    fn crime_summary(&self, locality: &Locality, options: &CrimeOptions) -> Option<CrimeSummary> {
        let source = self.crime.as_ref()?;
        let state = match locality.state_code() {
            Some(state) => state,
            None => {
                info!("skipping crime statistics, unknown state for {}", locality.zip);
                return None;
            }
        };
        match source.summary(state, options.offense, options.year) {
            Ok(summary) => Some(summary),
            Err(err) => {
                warn!("cannot fetch crime statistics for {}: {}", state, err);
                None
            }
        }
    }
}
