//! Capabilities the pipelines consume from the surrounding platform.

use std::path::Path;

use crate::record::RawRecord;
use crate::types::{BoundingBox, FileMetadata};

/// Per-file geospatial/temporal metadata reader.
///
/// `Ok` with empty fields means the file carries no such metadata; `Err`
/// means the file could not be read or parsed.
pub trait FileExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> anyhow::Result<FileMetadata>;
}

/// Pairwise similarity of two boxes and their file types. Higher is more
/// similar; the scale only has to be consistent within one request.
pub trait GeometryScorer: Send + Sync {
    fn score(&self, candidate: &BoundingBox, target: &BoundingBox, candidate_type: &str, target_type: &str) -> anyhow::Result<f64>;
}

/// Indexed record documents.
pub trait CandidateSource: Send + Sync {
    /// At most `limit` records, most recent first.
    fn recent(&self, limit: usize) -> anyhow::Result<Vec<RawRecord>>;
    fn fetch(&self, id: &str) -> anyhow::Result<Option<RawRecord>>;
}

impl<T: FileExtractor + ?Sized> FileExtractor for Box<T> {
    fn extract(&self, path: &Path) -> anyhow::Result<FileMetadata> { (**self).extract(path) }
}

impl<T: GeometryScorer + ?Sized> GeometryScorer for Box<T> {
    fn score(&self, candidate: &BoundingBox, target: &BoundingBox, candidate_type: &str, target_type: &str) -> anyhow::Result<f64> {
        (**self).score(candidate, target, candidate_type, target_type)
    }
}
