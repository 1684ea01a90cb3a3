#![deny(dead_code)]

//! geosim-aggregate
//!
//! Folds per-file spatial/temporal metadata into one record-level summary
//! and writes it into the record's search document on indexing.

pub mod fold;
pub mod hook;
pub mod path;
pub mod sidecar;

use std::path::PathBuf;

use geosim_core::traits::FileExtractor;
use geosim_core::{FileMetadata, FileRef, RecordSpatialSummary, SkipReason, Skipped};

pub use fold::SpatialFold;
pub use hook::{AggregationFailure, IndexingHook};
pub use sidecar::SidecarExtractor;

/// Summary plus the files that contributed nothing because they failed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregation {
    pub summary: RecordSpatialSummary,
    pub skipped: Vec<Skipped>,
}

pub struct Aggregator<E> where E: FileExtractor {
    extractor: E,
    data_root: PathBuf,
}

impl<E> Aggregator<E> where E: FileExtractor {
    pub fn new(extractor: E, data_root: impl Into<PathBuf>) -> Self { Self { extractor, data_root: data_root.into() } }

    pub fn aggregate(&self, files: &[FileRef]) -> RecordSpatialSummary { self.aggregate_with_log(files).summary }

    /// Extract every file and fold the results. A failing file is logged,
    /// recorded in `skipped` and otherwise ignored.
    pub fn aggregate_with_log(&self, files: &[FileRef]) -> Aggregation {
        let mut acc = SpatialFold::default();
        let mut skipped = Vec::new();
        for file in files {
            match self.extract_one(file) {
                Ok(meta) => acc.push(&meta),
                Err(reason) => {
                    tracing::warn!(file_id = %file.file_id, %reason, "Skipping file metadata.");
                    skipped.push(Skipped::new(file.file_id.clone(), reason));
                }
            }
        }
        let summary = RecordSpatialSummary {
            bbox: acc.bbox(),
            time_extent: acc.time(),
            dominant_file_type: files.first().and_then(|f| f.file_type.clone()),
        };
        tracing::debug!(files = files.len(), skipped = skipped.len(), has_bbox = summary.bbox.is_some(), has_time = summary.time_extent.is_some(), "Aggregated record metadata.");
        Aggregation { summary, skipped }
    }

    fn extract_one(&self, file: &FileRef) -> Result<FileMetadata, SkipReason> {
        let path = path::storage_path(&self.data_root, &file.file_id)?;
        self.extractor.extract(&path).map_err(|e| SkipReason::Extraction(format!("{e:#}")))
    }
}
