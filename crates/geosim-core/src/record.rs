//! Accessors over indexed record documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SkipReason;
use crate::types::{RecordId, RecordSpatialSummary};

/// An indexed record document as returned by the listing or lookup service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Value);

impl RawRecord {
    pub fn new(value: Value) -> Self { Self(value) }

    /// `recid`, falling back to `id`; numeric ids are rendered as decimal strings.
    pub fn id(&self) -> Option<RecordId> {
        ["recid", "id"].iter().find_map(|k| match self.0.get(k)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.0.pointer("/metadata/title").or_else(|| self.0.get("title")).and_then(Value::as_str)
    }

    /// Declared type of the first listed file.
    pub fn first_file_type(&self) -> Option<&str> {
        self.0.pointer("/_files/0/type").and_then(Value::as_str).filter(|t| !t.is_empty())
    }

    /// Stored summary from the `bbox` field, with the dominant file type filled in.
    pub fn summary(&self) -> Result<RecordSpatialSummary, SkipReason> {
        let stored = self.0.get("bbox").unwrap_or(&Value::Null);
        let mut summary = RecordSpatialSummary::from_index_value(stored)?;
        summary.dominant_file_type = self.first_file_type().map(str::to_owned);
        Ok(summary)
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self { Self(value) }
}
