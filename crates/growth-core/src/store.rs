use crate::family::MetricFamily;
use crate::models::{MetricRecord, MetricSeries, SERIES_SCHEMA_VERSION};
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("unsupported schema version {found} (this build writes {supported})")]
    UnsupportedSchema { found: u64, supported: u32 },
}

/// One JSON document per metric family under a data directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, family: MetricFamily) -> PathBuf {
        self.data_dir.join(family.file_name())
    }

    /// Reads the series of `family`. Missing or broken files are reported
    /// as an empty history, never as an error.
    pub fn load<V: DeserializeOwned>(&self, family: MetricFamily) -> MetricSeries<V> {
        match self.read_series(family) {
            Ok(series) => series,
            Err(error) => {
                warn!(%family, error = %error, "unreadable series, treating as empty history");
                MetricSeries::default()
            }
        }
    }

    /// Value of the most recent record, if any.
    pub fn last<V: DeserializeOwned>(&self, family: MetricFamily) -> Option<V> {
        self.load::<V>(family).into_records().pop().map(|record| record.count)
    }

    pub fn append<V>(&self, family: MetricFamily, count: V) -> Result<MetricRecord<V>, StoreError>
    where
        V: Serialize + DeserializeOwned + Clone,
    {
        self.append_at(family, count, Utc::now())
    }

    /// Appends one record stamped with `timestamp` and rewrites the file.
    pub fn append_at<V>(
        &self,
        family: MetricFamily,
        count: V,
        timestamp: DateTime<Utc>,
    ) -> Result<MetricRecord<V>, StoreError>
    where
        V: Serialize + DeserializeOwned + Clone,
    {
        let mut series = match self.read_series::<V>(family) {
            Ok(series) => series,
            Err(error @ StoreError::UnsupportedSchema { .. }) => return Err(error),
            Err(error) => {
                warn!(%family, error = %error, "discarding unreadable series before append");
                MetricSeries::default()
            }
        };

        let record = series.push(count, timestamp);

        let mut document = Map::new();
        document.insert("schema_version".to_owned(), Value::from(SERIES_SCHEMA_VERSION));
        document.insert(
            family.series_key().to_owned(),
            serde_json::to_value(series.records())?,
        );
        write_json_atomically(&self.path_for(family), &Value::Object(document))?;

        debug!(%family, id = record.id, "series record appended");
        Ok(record)
    }

    fn read_series<V: DeserializeOwned>(
        &self,
        family: MetricFamily,
    ) -> Result<MetricSeries<V>, StoreError> {
        let path = self.path_for(family);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(MetricSeries::default());
            }
            Err(error) => return Err(error.into()),
        };

        let mut document = match serde_json::from_str::<Value>(&raw)? {
            Value::Object(document) => document,
            _ => return Err(StoreError::NotAnObject),
        };

        if let Some(found) = document.get("schema_version").and_then(Value::as_u64) {
            if found > u64::from(SERIES_SCHEMA_VERSION) {
                return Err(StoreError::UnsupportedSchema {
                    found,
                    supported: SERIES_SCHEMA_VERSION,
                });
            }
        }

        let records = match document.remove(family.series_key()) {
            Some(records) => serde_json::from_value::<Vec<MetricRecord<V>>>(records)?,
            None => Vec::new(),
        };

        Ok(MetricSeries::from_records(records))
    }
}

/// Serializes `value` next to `path` and renames it into place, so readers
/// see either the old or the new document.
pub(crate) fn write_json_atomically<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&directory)?;

    let mut file = NamedTempFile::new_in(&directory)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;

    Ok(())
}
