//! Indexing-event hook: enriches a record document before it is indexed.

use serde_json::{Map, Value};
use thiserror::Error;

use geosim_core::traits::FileExtractor;
use geosim_core::{FileRef, RecordSpatialSummary, SkipReason, Skipped};

use crate::{Aggregation, Aggregator};

/// The document's file list as a whole could not be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationFailure {
    #[error("`_files` must be an array, found {0}")]
    NotAnArray(String),
}

/// Parsed `_files`: usable references plus the entries that were not.
/// A missing `_files` key is an empty list. Only `file_id` is required;
/// a non-string `type` reads as absent.
pub fn parse_file_list(files: Option<&Value>) -> Result<(Vec<FileRef>, Vec<Skipped>), AggregationFailure> {
    let entries = match files {
        None | Some(Value::Null) => return Ok((Vec::new(), Vec::new())),
        Some(Value::Array(entries)) => entries,
        Some(other) => return Err(AggregationFailure::NotAnArray(other.to_string())),
    };
    let mut refs = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        match entry.get("file_id").and_then(Value::as_str) {
            Some(id) => refs.push(FileRef { file_id: id.to_string(), file_type: entry_type(entry) }),
            None => skipped.push(Skipped::new(format!("_files[{i}]"), SkipReason::MalformedFileRef(format!("no string file_id in {entry}")))),
        }
    }
    Ok((refs, skipped))
}

pub struct IndexingHook<E> where E: FileExtractor {
    aggregator: Aggregator<E>,
}

impl<E> IndexingHook<E> where E: FileExtractor {
    pub fn new(aggregator: Aggregator<E>) -> Self { Self { aggregator } }

    /// Writes `bbox`, `filecount` and `size` into `document`. Never fails:
    /// an unusable file list leaves an explicit empty summary.
    pub fn on_index(&self, document: &mut Map<String, Value>) -> Aggregation {
        let files = document.get("_files");
        let (filecount, size) = file_stats(files);
        let aggregation = match parse_file_list(files) {
            Ok((refs, mut malformed)) => {
                for s in &malformed { tracing::warn!(item = %s.item, reason = %s.reason, "Skipping file entry."); }
                let mut aggregation = self.aggregator.aggregate_with_log(&refs);
                malformed.append(&mut aggregation.skipped);
                aggregation.skipped = malformed;
                // the ranker reads `_files[0].type`, even when that entry is unusable
                aggregation.summary.dominant_file_type = files.and_then(|f| f.get(0)).and_then(entry_type);
                aggregation
            }
            Err(e) => {
                tracing::warn!(record = ?record_label(document), error = %e, "Aggregation failed; storing empty summary.");
                Aggregation { summary: RecordSpatialSummary::empty(), skipped: Vec::new() }
            }
        };
        document.insert("bbox".into(), aggregation.summary.to_index_value());
        document.insert("filecount".into(), Value::from(filecount));
        document.insert("size".into(), Value::from(size));
        aggregation
    }
}

fn entry_type(entry: &Value) -> Option<String> {
    entry.get("type").and_then(Value::as_str).filter(|t| !t.is_empty()).map(str::to_owned)
}

fn file_stats(files: Option<&Value>) -> (u64, u64) {
    match files.and_then(Value::as_array) {
        Some(entries) => (entries.len() as u64, entries.iter().filter_map(|f| f.get("size").and_then(Value::as_u64)).sum()),
        None => (0, 0),
    }
}

fn record_label(document: &Map<String, Value>) -> Option<String> {
    document.get("recid").or_else(|| document.get("id")).map(Value::to_string)
}
