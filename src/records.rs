//! Persistent case store.
//!
//! The store is one CSV table with a fixed header. Appends rewrite the whole
//! table into a temporary file next to the store and rename it into place,
//! all while holding an exclusive lock on a sidecar `.lock` file, so readers
//! never observe a half-written table and concurrent appenders serialize.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{DiagnosisError, Result};
use crate::labels::{PrimaryLabel, Subtype};
use crate::models::{
    CaseRecord, ClassificationType, PatientInfo, Sex, format_timestamp, parse_timestamp,
};

/// Column order of the store. Never reorder: existing files depend on it.
pub const COLUMNS: [&str; 7] = [
    "Name",
    "Age",
    "Sex",
    "Classification Type",
    "Result",
    "Subtype",
    "Timestamp",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CaseRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Age")]
    age: String,
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Classification Type")]
    classification_type: String,
    #[serde(rename = "Result")]
    result: String,
    #[serde(rename = "Subtype")]
    subtype: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
}

impl CaseRow {
    fn from_record(record: &CaseRecord) -> Result<Self> {
        Ok(Self {
            name: record.patient.name().to_string(),
            age: record.patient.age().to_string(),
            sex: record.patient.sex().to_string(),
            classification_type: record.kind.to_string(),
            result: record.result.to_string(),
            subtype: record.subtype.map(|s| s.to_string()).unwrap_or_default(),
            timestamp: format_timestamp(record.timestamp)?,
        })
    }

    fn into_record(self) -> Result<CaseRecord> {
        let corrupt = |what: &str, value: &str| {
            DiagnosisError::CorruptStore(format!("invalid {} '{}'", what, value))
        };
        let sex: Sex = self.sex.parse().map_err(|_| corrupt("sex", &self.sex))?;
        let kind: ClassificationType = self
            .classification_type
            .parse()
            .map_err(|_| corrupt("classification type", &self.classification_type))?;
        let result: PrimaryLabel = self.result.parse()?;
        let subtype = if self.subtype.is_empty() {
            None
        } else {
            Some(self.subtype.parse::<Subtype>()?)
        };
        let timestamp = parse_timestamp(&self.timestamp)?;

        Ok(CaseRecord::from_parts(
            PatientInfo::from_stored(self.name, self.age, sex),
            kind,
            result,
            subtype,
            timestamp,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct CaseRecordStore {
    path: PathBuf,
}

impl CaseRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, returning the number of rows now stored.
    ///
    /// Appending the same record twice stores it twice.
    pub fn append(&self, record: &CaseRecord) -> Result<usize> {
        let dir = self.ensure_parent_dir()?;
        let _lock = self.lock()?;

        let mut rows = self.read_rows()?;
        rows.push(CaseRow::from_record(record)?);

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| DiagnosisError::io(&dir, e))?;
        {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush().map_err(|e| DiagnosisError::io(&self.path, e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| DiagnosisError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| DiagnosisError::io(&self.path, e.error))?;

        log::info!("Stored case record #{} in {}", rows.len(), self.path.display());
        Ok(rows.len())
    }

    /// Every stored record in insertion order; empty when no store exists yet.
    pub fn load_all(&self) -> Result<Vec<CaseRecord>> {
        self.read_rows()?
            .into_iter()
            .map(CaseRow::into_record)
            .collect()
    }

    fn read_rows(&self) -> Result<Vec<CaseRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        if !headers.iter().eq(COLUMNS.iter().copied()) {
            return Err(DiagnosisError::CorruptStore(format!(
                "{} has columns {:?}, expected {:?}",
                self.path.display(),
                headers.iter().collect::<Vec<_>>(),
                COLUMNS
            )));
        }

        let rows = reader
            .deserialize::<CaseRow>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn ensure_parent_dir(&self) -> Result<PathBuf> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| DiagnosisError::io(&dir, e))?;
        Ok(dir)
    }

    /// Exclusive lock held until the returned file is dropped.
    fn lock(&self) -> Result<File> {
        let mut lock_path = self.path.clone().into_os_string();
        lock_path.push(".lock");
        let lock_path = PathBuf::from(lock_path);

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| DiagnosisError::io(&lock_path, e))?;
        file.lock().map_err(|e| DiagnosisError::io(&lock_path, e))?;
        Ok(file)
    }
}
