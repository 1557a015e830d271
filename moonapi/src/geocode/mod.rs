//! Resolving US ZIP codes to a county, a state and coordinates.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{MoonError, Result};

mod zip_directory;
mod zippopotam;

pub use zip_directory::{ZipDirectory, ZipRecord};
pub use zippopotam::ZippopotamGeocoder;

pub const UNKNOWN_COUNTY: &str = "Unknown County";
pub const UNKNOWN_STATE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// The latitude in degrees.
    pub latitude: f64,
    /// The longitude in degrees.
    pub longitude: f64,
    pub display_name: String,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, display_name: impl ToString) -> Self {
        Self {
            latitude,
            longitude,
            display_name: display_name.to_string(),
        }
    }
}

/// What is known about a ZIP code. A lookup miss is represented by the
/// [`UNKNOWN_COUNTY`] / [`UNKNOWN_STATE`] sentinels and no location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locality {
    pub zip: String,
    pub county: String,
    pub state: String,
    pub location: Option<Location>,
}

impl Locality {
    pub fn unknown(zip: impl ToString) -> Self {
        Self {
            zip: zip.to_string(),
            county: UNKNOWN_COUNTY.to_string(),
            state: UNKNOWN_STATE.to_string(),
            location: None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.location.is_some() || self.state != UNKNOWN_STATE
    }

    /// The state as two letter postal code, if there is one.
    pub fn state_code(&self) -> Option<&str> {
        let state = self.state.as_str();
        if state.len() == 2 && state.chars().all(|c| c.is_ascii_uppercase()) {
            Some(state)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Locality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} ({})", loc.display_name, self.zip),
            None => write!(f, "{}, {} ({})", self.county, self.state, self.zip),
        }
    }
}

pub trait Geocoder {
    /// Looks up a ZIP code. Unknown codes resolve to [`Locality::unknown`],
    /// errors are reserved for malformed input and upstream failures.
    fn resolve(&self, query: &str) -> Result<Locality>;
}

impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    fn resolve(&self, query: &str) -> Result<Locality> {
        (**self).resolve(query)
    }
}

/// Accepts `12345` and `12345-6789`, returns the five digit part.
pub fn normalize_zip(input: &str) -> Result<String> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^\s*([0-9]{5})(?:-[0-9]{4})?\s*$").unwrap();
    }
    RE.captures(input)
        .and_then(|captures| captures.get(1))
        .map(|zip| zip.as_str().to_string())
        .ok_or_else(|| MoonError::InvalidZip(input.to_string()))
}
