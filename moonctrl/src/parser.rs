use chrono::prelude::*;
use moonapi::OffenseCode;

pub(crate) fn parse_date(val: &str) -> Result<DateTime<Utc>, String> {
    moonapi::parse_instant(val).map_err(|err| err.to_string())
}

fn parse_coord(val: &str, limit: f64) -> Result<f64, String> {
    let coord = val.trim().parse::<f64>().map_err(|err| err.to_string())?;
    if coord.is_finite() && coord.abs() <= limit {
        Ok(coord)
    } else {
        Err(format!("must be between -{} and {}", limit, limit))
    }
}

pub(crate) fn parse_latitude(val: &str) -> Result<f64, String> {
    parse_coord(val, 90.0)
}

pub(crate) fn parse_longitude(val: &str) -> Result<f64, String> {
    parse_coord(val, 180.0)
}

pub(crate) fn parse_zip(val: &str) -> Result<String, String> {
    moonapi::geocode::normalize_zip(val).map_err(|err| err.to_string())
}

pub(crate) fn parse_offense(val: &str) -> Result<OffenseCode, String> {
    val.parse::<OffenseCode>().map_err(|err| err.to_string())
}
