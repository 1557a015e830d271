use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use super::{normalize_zip, Geocoder, Locality, Location, UNKNOWN_COUNTY};
use crate::error::{MoonError, Result};
use crate::http::{self, Fetched};

const DEFAULT_BASE_URL: &str = "https://api.zippopotam.us/us";

/// Looks ZIP codes up at zippopotam.us. That service knows places and states
/// but not counties, the county is always [`UNKNOWN_COUNTY`].
pub struct ZippopotamGeocoder {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PostCode {
    places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(rename = "place name")]
    name: String,
    #[serde(rename = "state abbreviation")]
    state: String,
    latitude: String,
    longitude: String,
}

impl ZippopotamGeocoder {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http::client(timeout)?,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl ToString) -> Self {
        self.base_url = base_url.to_string().trim_end_matches('/').to_string();
        self
    }
}

impl Geocoder for ZippopotamGeocoder {
    fn resolve(&self, query: &str) -> Result<Locality> {
        let zip = normalize_zip(query)?;
        let url = format!("{}/{}", self.base_url, zip);
        match http::get(&self.client, &url, &[])? {
            Fetched::NotFound => Ok(Locality::unknown(zip)),
            Fetched::Body(body) => parse_post_code(&body, zip),
        }
    }
}

fn parse_post_code(body: &str, zip: String) -> Result<Locality> {
    let post_code: PostCode = serde_json::from_str(body)?;
    let place = match post_code.places.into_iter().next() {
        Some(place) => place,
        None => return Ok(Locality::unknown(zip)),
    };

    let coordinate = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| MoonError::UnsupportedResponse(format!("bad coordinate {:?}", value)))
    };
    let latitude = coordinate(&place.latitude)?;
    let longitude = coordinate(&place.longitude)?;

    Ok(Locality {
        zip,
        county: UNKNOWN_COUNTY.to_string(),
        location: Some(Location::new(
            latitude,
            longitude,
            format!("{}, {}", place.name, place.state),
        )),
        state: place.state,
    })
}
