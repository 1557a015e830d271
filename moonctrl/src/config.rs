use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{ProjectDirs, UserDirs};
use serde::Deserialize;

/// A configuration that is constructed from ~/.moonphase[.toml|.yaml|.json]
/// and environment vars prefixed with MOONPHASE_, e.g. MOONPHASE_API_KEY.
/// Command line flags take precedence.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    pub api_key: Option<String>,
    pub zip_data: Option<PathBuf>,
    pub zip_cache: Option<PathBuf>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timeout_secs: Option<u64>,
    pub offense: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let home_config = UserDirs::new().map(|dirs| dirs.home_dir().join(".moonphase"));
        Self::from_sources(home_config.as_deref(), "moonphase")
    }

    fn from_sources(file: Option<&Path>, env_prefix: &str) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file.and_then(|p| p.to_str()) {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder
            .add_source(config::Environment::with_prefix(env_prefix))
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(moonapi::DEFAULT_TIMEOUT)
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "moonphase")
}

/// `<data dir>/moonphase/zipcodes.json`
pub fn default_zip_data() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join("zipcodes.json"))
}

/// `<cache dir>/moonphase/zip_cache.json`
pub fn default_zip_cache() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().join("zip_cache.json"))
}
