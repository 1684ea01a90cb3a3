#![deny(unused_variables)]
#![deny(unused_imports)]
#![deny(dead_code)]

pub mod config;
pub mod error;
pub mod record;
pub mod traits;
pub mod types;

pub use error::{Error, Result, SkipReason, Skipped};
pub use record::RawRecord;
pub use types::{BoundingBox, CandidateRecord, FileMetadata, FileRef, RecordId, RecordSpatialSummary, SimilarityReport, SimilarityResult, TimeExtent};
