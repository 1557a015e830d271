//! The summarized statistics endpoint answered in two shapes over time. The
//! current one nests monthly counts under `offenses.actuals`, the legacy one
//! lists yearly rows under `results`.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{MoonError, Result};

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    offenses: CurrentOffenses,
}

#[derive(Debug, Deserialize)]
struct CurrentOffenses {
    actuals: BTreeMap<String, BTreeMap<String, Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct LegacyResponse {
    results: Vec<LegacyRow>,
}

#[derive(Debug, Deserialize)]
struct LegacyRow {
    data_year: Option<i32>,
    actual: Option<f64>,
}

impl CurrentResponse {
    /// Sums the months of `year` over all series of the state, skipping the
    /// national comparison series and clearances.
    fn total(&self, year: i32) -> Option<u64> {
        let suffix = format!("-{}", year);
        let series: Vec<_> = self
            .offenses
            .actuals
            .iter()
            .filter(|(name, _)| {
                !name.starts_with("United States") && !name.contains("Clearance")
            })
            .collect();
        if series.is_empty() {
            return None;
        }

        let total: f64 = series
            .iter()
            .flat_map(|(_, months)| months.iter())
            .filter(|(month, _)| month.ends_with(&suffix))
            .filter_map(|(_, count)| *count)
            .sum();
        Some(total.round() as u64)
    }
}

impl LegacyResponse {
    fn total(&self, year: i32) -> u64 {
        let total: f64 = self
            .results
            .iter()
            .filter(|row| row.data_year.map(|y| y == year).unwrap_or(true))
            .filter_map(|row| row.actual)
            .sum();
        total.round() as u64
    }
}

/// Total number of offenses for `year`, trying the current schema first.
pub(crate) fn parse_total(body: &str, year: i32) -> Result<u64> {
    if let Ok(current) = serde_json::from_str::<CurrentResponse>(body) {
        trace!("[crime] current response schema");
        return current
            .total(year)
            .ok_or_else(|| MoonError::UnsupportedResponse("no offense series".to_string()));
    }
    if let Ok(legacy) = serde_json::from_str::<LegacyResponse>(body) {
        trace!("[crime] legacy response schema");
        return Ok(legacy.total(year));
    }
    let excerpt: String = body.chars().take(80).collect();
    Err(MoonError::UnsupportedResponse(excerpt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_schema() {
        let body = r#"{
            "offenses": {
                "rates": {"Colorado Offenses": {"01-2022": 40.1}},
                "actuals": {
                    "Colorado Offenses": {"01-2022": 2000, "02-2022": 1500.0, "12-2021": 999, "03-2022": null},
                    "United States Offenses": {"01-2022": 100000},
                    "Colorado Clearances": {"01-2022": 700}
                }
            }
        }"#;
        assert_eq!(parse_total(body, 2022).unwrap(), 3500);
        assert_eq!(parse_total(body, 2021).unwrap(), 999);
    }

    #[test]
    fn current_schema_without_state_series() {
        let body = r#"{"offenses": {"actuals": {"United States Offenses": {"01-2022": 1}}}}"#;
        assert!(matches!(
            parse_total(body, 2022),
            Err(MoonError::UnsupportedResponse(_))
        ));
    }

    #[test]
    fn legacy_schema() {
        let body = r#"{"results": [
            {"data_year": 2019, "offense": "violent-crime", "state_abbr": "CO", "actual": 16445},
            {"data_year": 2018, "offense": "violent-crime", "state_abbr": "CO", "actual": 15000}
        ]}"#;
        assert_eq!(parse_total(body, 2019).unwrap(), 16445);
        assert_eq!(parse_total(body, 2017).unwrap(), 0);
    }

    #[test]
    fn unknown_schema() {
        assert!(matches!(
            parse_total(r#"{"data": []}"#, 2022),
            Err(MoonError::UnsupportedResponse(_))
        ));
        assert!(parse_total("<html>", 2022).is_err());
    }
}
