//! FBI Crime Data Explorer statistics for a state. Used as a best-effort
//! enrichment of the moon report.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;

use crate::error::{MoonError, Result};
use crate::http::{self, Fetched};

mod offense;
mod response;

pub use offense::OffenseCode;

const DEFAULT_BASE_URL: &str = "https://api.usa.gov/crime/fbi/cde/summarized/state";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrimeSummary {
    pub state: String,
    pub offense: OffenseCode,
    /// The year the numbers are for. May be earlier than the requested year
    /// when that one was not published yet.
    pub year: i32,
    pub total: u64,
}

impl std::fmt::Display for CrimeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} in {}: {}",
            self.state,
            self.offense.name(),
            self.year,
            self.total
        )
    }
}

/// Client for the summarized state statistics.
pub struct CrimeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CrimeClient {
    pub fn new(api_key: impl ToString, timeout: Duration) -> Result<Self> {
        let api_key = api_key.to_string();
        if api_key.trim().is_empty() {
            return Err(MoonError::MissingApiKey);
        }
        Ok(CrimeClient {
            client: http::client(timeout)?,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl ToString) -> Self {
        self.base_url = base_url.to_string().trim_end_matches('/').to_string();
        self
    }

    /// Offense total of `state` (two letter code) for `year`. When the api has
    /// nothing for `year` the previous year is tried once.
    pub fn summary(&self, state: &str, offense: OffenseCode, year: i32) -> Result<CrimeSummary> {
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MoonError::InvalidState(state.to_string()));
        }
        let state = state.to_uppercase();

        for year in [year, year - 1] {
            match self.fetch(&state, offense, year)? {
                Fetched::Body(body) => {
                    let total = response::parse_total(&body, year)?;
                    return Ok(CrimeSummary {
                        state,
                        offense,
                        year,
                        total,
                    });
                }
                Fetched::NotFound => {
                    warn!("[crime] no {} data for {} in {}", offense.name(), state, year);
                }
            }
        }

        Err(MoonError::Status {
            url: self.url(&state, offense),
            status: reqwest::StatusCode::NOT_FOUND,
        })
    }

    // -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

    fn url(&self, state: &str, offense: OffenseCode) -> String {
        format!("{}/{}/{}", self.base_url, state, offense.code())
    }

    fn fetch(&self, state: &str, offense: OffenseCode, year: i32) -> Result<Fetched> {
        let from = format!("01-{}", year);
        let to = format!("12-{}", year);
        http::get(
            &self.client,
            &self.url(state, offense),
            &[
                ("from", from.as_str()),
                ("to", to.as_str()),
                ("API_KEY", self.api_key.as_str()),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_api_key() {
        assert!(matches!(
            CrimeClient::new("  ", http::DEFAULT_TIMEOUT),
            Err(MoonError::MissingApiKey)
        ));
    }

    #[test]
    fn rejects_non_state_codes() {
        let client = CrimeClient::new("key", http::DEFAULT_TIMEOUT).unwrap();
        for state in ["Unknown", "C", "C0", ""] {
            assert!(matches!(
                client.summary(state, OffenseCode::Robbery, 2022),
                Err(MoonError::InvalidState(_))
            ));
        }
    }

    #[test]
    fn url_layout() {
        let client = CrimeClient::new("key", http::DEFAULT_TIMEOUT)
            .unwrap()
            .with_base_url("http://localhost:1234/state/");
        assert_eq!(
            client.url("CO", OffenseCode::Burglary),
            "http://localhost:1234/state/CO/BUR"
        );
    }

    #[test]
    fn summary_display() {
        let summary = CrimeSummary {
            state: "CO".to_string(),
            offense: OffenseCode::ViolentCrime,
            year: 2022,
            total: 29_000,
        };
        assert_eq!(summary.to_string(), "CO violent crime in 2022: 29000");
    }

    #[test]
    fn falls_back_to_previous_year() {
        let body = r#"{"offenses": {"actuals": {"Colorado Offenses": {"01-2022": 10, "02-2022": 5}}}}"#;
        let (base_url, server) = http::testing::serve(vec![(404, ""), (200, body)]);
        let client = CrimeClient::new("key", http::DEFAULT_TIMEOUT)
            .unwrap()
            .with_base_url(format!("{}/state", base_url));

        let summary = client.summary("co", OffenseCode::ViolentCrime, 2023).unwrap();
        assert_eq!(summary.state, "CO");
        assert_eq!(summary.year, 2022);
        assert_eq!(summary.total, 15);

        let requests = server.join().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("GET /state/CO/V?from=01-2023&to=12-2023"));
        assert!(requests[1].starts_with("GET /state/CO/V?from=01-2022&to=12-2022"));
    }

    #[test]
    fn gives_up_after_one_fallback() {
        let (base_url, server) = http::testing::serve(vec![(404, ""), (404, "")]);
        let client = CrimeClient::new("key", http::DEFAULT_TIMEOUT)
            .unwrap()
            .with_base_url(base_url);

        let result = client.summary("CO", OffenseCode::Robbery, 2023);
        assert!(matches!(
            result,
            Err(MoonError::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND
        ));
        assert_eq!(server.join().unwrap().len(), 2);
    }
}
