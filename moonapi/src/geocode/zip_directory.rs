use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{normalize_zip, Geocoder, Locality, Location};
use crate::error::Result;

/// One row of the ZIP dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipRecord {
    pub zip: String,
    #[serde(default)]
    pub city: Option<String>,
    pub county: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ZipRecord {
    pub fn display_name(&self) -> String {
        match &self.city {
            Some(city) => format!("{}, {}, {}", city, self.county, self.state),
            None => format!("{}, {}", self.county, self.state),
        }
    }

    fn to_locality(&self) -> Locality {
        Locality {
            zip: self.zip.clone(),
            county: self.county.clone(),
            state: self.state.clone(),
            location: Some(Location::new(
                self.latitude,
                self.longitude,
                self.display_name(),
            )),
        }
    }
}

/// In-memory ZIP lookup table. Built once per run from the dataset (a JSON
/// array of [`ZipRecord`]s) or from a keyed cache dump of an earlier build.
#[derive(Debug, Default, Clone)]
pub struct ZipDirectory {
    records: HashMap<String, ZipRecord>,
}

impl ZipDirectory {
    pub fn from_records(records: impl IntoIterator<Item = ZipRecord>) -> Self {
        let records = records
            .into_iter()
            .filter_map(|mut record| match normalize_zip(&record.zip) {
                Ok(zip) => {
                    record.zip = zip.clone();
                    Some((zip, record))
                }
                Err(_) => {
                    warn!("[zip] skipping record with invalid zip {:?}", record.zip);
                    None
                }
            })
            .collect();
        Self { records }
    }

    pub fn from_dataset(reader: impl Read) -> Result<Self> {
        let records: Vec<ZipRecord> = serde_json::from_reader(reader)?;
        Ok(Self::from_records(records))
    }

    pub fn from_dataset_file(path: impl AsRef<Path>) -> Result<Self> {
        let f = File::open(path)?;
        Self::from_dataset(BufReader::new(f))
    }

    /// Loads the cache at `cache` if it is readable, otherwise builds the
    /// directory from `dataset` and rewrites the cache. Failing to write the
    /// cache is not an error.
    pub fn open(dataset: impl AsRef<Path>, cache: impl AsRef<Path>) -> Result<Self> {
        let dataset = dataset.as_ref();
        let cache = cache.as_ref();

        match Self::read_cache(cache) {
            Ok(directory) => {
                debug!("[zip] loaded {} records from cache {:?}", directory.len(), cache);
                return Ok(directory);
            }
            Err(err) => {
                info!("[zip] cache {:?} not usable ({}), rebuilding from {:?}", cache, err, dataset);
            }
        }

        let directory = Self::from_dataset_file(dataset)?;
        if let Err(err) = directory.write_cache(cache) {
            warn!("[zip] cannot write cache {:?}: {}", cache, err);
        }
        Ok(directory)
    }

    pub fn read_cache(path: impl AsRef<Path>) -> Result<Self> {
        let f = File::open(path)?;
        let records: HashMap<String, ZipRecord> = serde_json::from_reader(BufReader::new(f))?;
        Ok(Self { records })
    }

    pub fn write_cache(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let f = File::create(path)?;
        serde_json::to_writer(BufWriter::new(f), &self.records)?;
        Ok(())
    }

    pub fn get(&self, zip: &str) -> Option<&ZipRecord> {
        normalize_zip(zip).ok().and_then(|zip| self.records.get(&zip))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Geocoder for ZipDirectory {
    fn resolve(&self, query: &str) -> Result<Locality> {
        let zip = normalize_zip(query)?;
        match self.records.get(&zip) {
            Some(record) => Ok(record.to_locality()),
            None => {
                info!("[zip] no record for {}", zip);
                Ok(Locality::unknown(zip))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::{UNKNOWN_COUNTY, UNKNOWN_STATE};
    use tracing_test::traced_test;

    const DATASET: &str = r#"[
        {"zip": "02108", "city": "Boston", "county": "Suffolk County", "state": "MA", "latitude": 42.3576, "longitude": -71.0684},
        {"zip": "99723", "city": "Utqiagvik", "county": "North Slope Borough", "state": "AK", "latitude": 71.2906, "longitude": -156.7886},
        {"zip": "8020", "county": "Broken", "state": "CO", "latitude": 0.0, "longitude": 0.0}
    ]"#;

    fn directory() -> ZipDirectory {
        ZipDirectory::from_dataset(DATASET.as_bytes()).unwrap()
    }

    #[test]
    fn resolves_known_zip() {
        let locality = directory().resolve("02108").unwrap();
        assert_eq!(locality.county, "Suffolk County");
        assert_eq!(locality.state_code(), Some("MA"));
        let loc = locality.location.unwrap();
        assert_eq!(loc.display_name, "Boston, Suffolk County, MA");
        assert!((loc.latitude - 42.3576).abs() < 1e-9);
    }

    #[test]
    fn unknown_zip_is_a_sentinel() {
        let locality = directory().resolve("12345").unwrap();
        assert_eq!(locality.county, UNKNOWN_COUNTY);
        assert_eq!(locality.state, UNKNOWN_STATE);
        assert!(locality.location.is_none());
    }

    #[test]
    fn malformed_zip_is_an_error() {
        assert!(directory().resolve("boston").is_err());
    }

    #[test]
    #[traced_test]
    fn invalid_records_are_skipped() {
        let directory = directory();
        assert_eq!(directory.len(), 2);
        assert!(logs_contain("skipping record with invalid zip"));
    }

    #[test]
    #[traced_test]
    fn cache_is_built_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("zipcodes.json");
        let cache = dir.path().join("cache").join("zip_cache.json");
        fs::write(&dataset, DATASET).unwrap();

        let first = ZipDirectory::open(&dataset, &cache).unwrap();
        assert!(cache.exists());
        assert!(logs_contain("rebuilding from"));

        // the cache is used even when the dataset is gone
        fs::remove_file(&dataset).unwrap();
        let second = ZipDirectory::open(&dataset, &cache).unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(second.get("99723"), first.get("99723"));
    }

    #[test]
    fn unreadable_cache_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("zipcodes.json");
        let cache = dir.path().join("zip_cache.json");
        fs::write(&dataset, DATASET).unwrap();
        fs::write(&cache, "not json").unwrap();

        let directory = ZipDirectory::open(&dataset, &cache).unwrap();
        assert_eq!(directory.len(), 2);
        assert!(ZipDirectory::read_cache(&cache).is_ok());
    }

    #[test]
    fn missing_dataset_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let result = ZipDirectory::open(dir.path().join("nope.json"), dir.path().join("c.json"));
        assert!(result.is_err());
    }
}
