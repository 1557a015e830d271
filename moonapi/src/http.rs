use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::error::{MoonError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) enum Fetched {
    Body(String),
    NotFound,
}

pub(crate) fn client(timeout: Duration) -> Result<Client> {
    let builder = Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
    // tests talk to a server on localhost
    #[cfg(test)]
    let builder = builder.no_proxy();
    Ok(builder.build()?)
}

/// Sends a GET request. A 404 is reported as [`Fetched::NotFound`], any other
/// non-success status is an error. Query values are not logged, they may
/// carry api keys.
pub(crate) fn get(client: &Client, url: &str, query: &[(&str, &str)]) -> Result<Fetched> {
    let response = client.get(url).query(query).send()?;
    let status = response.status();
    info!(
        "[http] GET {} status: {:?} {:?}",
        url,
        status,
        status.canonical_reason().unwrap_or_default()
    );

    if status == StatusCode::NOT_FOUND {
        return Ok(Fetched::NotFound);
    }
    if !status.is_success() {
        return Err(MoonError::Status {
            url: url.to_string(),
            status,
        });
    }
    Ok(Fetched::Body(response.text()?))
}
