//! In-memory candidate source over a snapshot of indexed records.

use std::fs;
use std::path::Path;

use serde_json::Value;

use geosim_core::traits::CandidateSource;
use geosim_core::{Error, RawRecord};

/// Records held in recency order, newest first.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    records: Vec<RawRecord>,
}

impl SnapshotSource {
    pub fn new(records: Vec<RawRecord>) -> Self { Self { records } }

    /// Load a JSON array of record documents.
    pub fn load(path: &Path) -> geosim_core::Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        let value: Value = serde_json::from_str(&raw).map_err(|source| Error::Json { path: path.to_path_buf(), source })?;
        match value {
            Value::Array(items) => Ok(Self::new(items.into_iter().map(RawRecord::new).collect())),
            _ => Err(Error::Operation(format!("{} must contain a JSON array of records", path.display()))),
        }
    }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

impl CandidateSource for SnapshotSource {
    fn recent(&self, limit: usize) -> anyhow::Result<Vec<RawRecord>> {
        Ok(self.records.iter().take(limit).cloned().collect())
    }

    fn fetch(&self, id: &str) -> anyhow::Result<Option<RawRecord>> {
        Ok(self.records.iter().find(|r| r.id().as_deref() == Some(id)).cloned())
    }
}
