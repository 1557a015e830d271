//! Astronomical queries needed by the phase classifier and the rise / set
//! calculator. [`AnalyticEphemeris`] is the implementation used by the
//! command line tool, tests plug in their own [`Ephemeris`].

use chrono::prelude::*;

mod analytic;
mod lunar_terms;

pub use analytic::{AnalyticEphemeris, MoonPosition};

/// A point on earth for which horizon events are computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// The latitude in degrees, north positive.
    pub latitude: f64,
    /// The longitude in degrees, east positive.
    pub longitude: f64,
}

impl Observer {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<&crate::Location> for Observer {
    fn from(loc: &crate::Location) -> Self {
        Observer::new(loc.latitude, loc.longitude)
    }
}

/// Why a horizon crossing was not found in the search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Circumpolar {
    AlwaysUp,
    NeverUp,
}

/// Outcome of a rise or set query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizonEvent {
    Rise(DateTime<Utc>),
    Set(DateTime<Utc>),
    NotObserved(Circumpolar),
}

impl HorizonEvent {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        match self {
            HorizonEvent::Rise(time) | HorizonEvent::Set(time) => Some(*time),
            HorizonEvent::NotObserved(_) => None,
        }
    }

    pub fn is_observed(&self) -> bool {
        self.time().is_some()
    }
}

pub trait Ephemeris {
    /// Illuminated fraction of the visible lunar disk in percent (0-100).
    fn illumination(&self, at: DateTime<Utc>) -> f64;

    /// The latest new moon at or before `at`.
    fn previous_new_moon(&self, at: DateTime<Utc>) -> DateTime<Utc>;

    /// Next moonrise after `after`. Returns [`HorizonEvent::Rise`] or
    /// [`HorizonEvent::NotObserved`].
    fn next_rising(&self, observer: &Observer, after: DateTime<Utc>) -> HorizonEvent;

    /// Next moonset after `after`. Returns [`HorizonEvent::Set`] or
    /// [`HorizonEvent::NotObserved`].
    fn next_setting(&self, observer: &Observer, after: DateTime<Utc>) -> HorizonEvent;
}

impl<E: Ephemeris + ?Sized> Ephemeris for &E {
    fn illumination(&self, at: DateTime<Utc>) -> f64 {
        (**self).illumination(at)
    }

    fn previous_new_moon(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        (**self).previous_new_moon(at)
    }

    fn next_rising(&self, observer: &Observer, after: DateTime<Utc>) -> HorizonEvent {
        (**self).next_rising(observer, after)
    }

    fn next_setting(&self, observer: &Observer, after: DateTime<Utc>) -> HorizonEvent {
        (**self).next_setting(observer, after)
    }
}
