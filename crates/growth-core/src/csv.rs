//! Spreadsheet-friendly mirror of the JSON series, one row per run.

use crate::family::MetricFamily;
use crate::models::MetricRecord;
use crate::store::StoreError;
use chrono::SecondsFormat;
use std::fmt::Display;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CSV_HEADER: &str = "Date,Metric Label,Count,AdditionalInfo";

#[derive(Debug, Clone)]
pub struct CsvMirror {
    csv_dir: PathBuf,
}

impl CsvMirror {
    /// Mirrors live in `<data_dir>/csv/`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            csv_dir: data_dir.as_ref().join("csv"),
        }
    }

    pub fn path_for(&self, family: MetricFamily) -> PathBuf {
        let stem = Path::new(family.file_name())
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| family.key().to_owned());
        self.csv_dir.join(format!("{stem}.csv"))
    }

    pub fn append_row<V: Display>(
        &self,
        family: MetricFamily,
        label: &str,
        record: &MetricRecord<V>,
        additional_info: &str,
    ) -> Result<(), StoreError> {
        fs::create_dir_all(&self.csv_dir)?;

        let path = self.path_for(family);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let write_header = file.metadata()?.len() == 0;

        let mut buffer = String::new();
        if write_header {
            buffer.push_str(CSV_HEADER);
            buffer.push('\n');
        }
        buffer.push_str(&csv_row(&[
            record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            label.to_owned(),
            record.count.to_string(),
            additional_info.to_owned(),
        ]));
        buffer.push('\n');

        file.write_all(buffer.as_bytes())?;
        Ok(())
    }
}

fn csv_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| escape_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
