//! Lunar phase, moonrise and moonset computation for the `moonphase` utility.
//!
//! The phase of a date is derived from the illuminated fraction of the moon
//! and its age within the current lunation, see [`phase::classify`]. Rise and
//! set times come from the same [`Ephemeris`].
//!
//! ## Example
//!
//! ```ignore
//! let ephemeris = moonapi::AnalyticEphemeris::new();
//!
//! // Phase of a date
//! let classifier = moonapi::PhaseClassifier::new(ephemeris);
//! let obs = classifier.observe(chrono::NaiveDate::from_ymd_opt(2024, 1, 25).unwrap());
//! println!("{} {} {}%", obs.phase.emoji(), obs.phase, obs.illumination_display());
//!
//! // Moonrise and moonset in Boston
//! let calc = moonapi::RiseSetCalculator::new(ephemeris);
//! let times = calc.compute(&moonapi::Observer::new(42.36, -71.06), obs.instant);
//! println!("rise {} set {}", times.format_rise(&chrono::Local), times.format_set(&chrono::Local));
//! ```

#[macro_use]
extern crate tracing;

pub mod crime;
pub mod ephemeris;
pub mod error;
pub mod geocode;
pub(crate) mod http;
pub mod phase;
pub mod riseset;

pub use crime::{CrimeClient, CrimeSummary, OffenseCode};
pub use ephemeris::{AnalyticEphemeris, Circumpolar, Ephemeris, HorizonEvent, MoonPosition, Observer};
pub use error::{MoonError, Result};
pub use geocode::{Geocoder, Locality, Location, ZipDirectory, ZipRecord, ZippopotamGeocoder};
pub use http::DEFAULT_TIMEOUT;
pub use phase::{classify, parse_instant, Phase, PhaseClassifier, PhaseObservation};
pub use riseset::{RiseSetCalculator, RiseSetTimes, NOT_OBSERVED};
