#[derive(thiserror::Error, Debug)]
pub enum MoonError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("cannot parse json: `{0}`")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a valid US ZIP code: {0:?}")]
    InvalidZip(String),

    #[error("cannot parse date {0:?}, expected YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS]")]
    InvalidDate(String),

    #[error("date {0} is outside of the supported range")]
    DateOutOfRange(chrono::NaiveDate),

    #[error("unknown offense {0:?}")]
    UnknownOffense(String),

    #[error("crime statistics need a two letter state code, got {0:?}")]
    InvalidState(String),

    #[error("crime statistics response has no known shape: {0}")]
    UnsupportedResponse(String),

    #[error("no FBI API key configured, set FBI_API_KEY or use --api-key")]
    MissingApiKey,
}

pub type Result<T> = std::result::Result<T, MoonError>;
