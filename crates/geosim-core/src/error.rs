use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error("Failed to parse {path}: {source}")]
    Json { path: PathBuf, #[source] source: serde_json::Error },

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single file or candidate was left out of a pipeline.
///
/// These never abort a request; they are collected next to the kept items
/// and logged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("metadata extraction failed: {0}")]
    Extraction(String),

    #[error("malformed file reference: {0}")]
    MalformedFileRef(String),

    #[error("no bounding box")]
    MissingBbox,

    #[error("malformed bounding box: {0}")]
    MalformedBbox(String),

    #[error("no file type")]
    MissingFileType,

    #[error("no record id")]
    MissingId,

    #[error("record is the query target")]
    SelfMatch,

    #[error("scoring failed: {0}")]
    Scoring(String),

    #[error("non-finite score {0}")]
    NonFiniteScore(f64),
}

/// A dropped item and the reason it was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub item: String,
    pub reason: SkipReason,
}

impl Skipped {
    pub fn new(item: impl Into<String>, reason: SkipReason) -> Self {
        Self { item: item.into(), reason }
    }
}
