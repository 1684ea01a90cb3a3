//! Domain types shared by the aggregation and similarity pipelines.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::SkipReason;

pub type RecordId = String;

/// Axis-aligned longitude/latitude rectangle.
///
/// Raw per-file boxes are taken as-is; `min <= max` only holds for boxes
/// produced by [`BoundingBox::union`] over well-formed inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self { min_lon, min_lat, max_lon, max_lat }
    }

    /// Smallest box containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let b = Self {
            min_lon: self.min_lon.max(other.min_lon),
            min_lat: self.min_lat.max(other.min_lat),
            max_lon: self.max_lon.min(other.max_lon),
            max_lat: self.max_lat.min(other.max_lat),
        };
        (b.min_lon <= b.max_lon && b.min_lat <= b.max_lat).then_some(b)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        (self.max_lon - self.min_lon).max(0.0) * (self.max_lat - self.min_lat).max(0.0)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|c| c.is_finite())
    }

    #[must_use]
    pub const fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    /// Closed polygon ring, counter-clockwise from the lower-left corner.
    #[must_use]
    pub const fn ring(&self) -> [[f64; 2]; 5] {
        [
            [self.min_lon, self.min_lat],
            [self.max_lon, self.min_lat],
            [self.max_lon, self.max_lat],
            [self.min_lon, self.max_lat],
            [self.min_lon, self.min_lat],
        ]
    }

    /// Parse a stored box: either `[min_lon, min_lat, max_lon, max_lat]` or
    /// `[[min_lon, min_lat], [max_lon, max_lat]]`.
    ///
    /// `null`, `[]` and `[null]` are the "no box" marker and map to
    /// [`SkipReason::MissingBbox`]; any other shape is malformed.
    pub fn from_value(value: &Value) -> Result<Self, SkipReason> {
        let items = match value {
            Value::Null => return Err(SkipReason::MissingBbox),
            Value::Array(items) => items,
            other => return Err(SkipReason::MalformedBbox(other.to_string())),
        };
        if items.is_empty() || (items.len() == 1 && items[0].is_null()) {
            return Err(SkipReason::MissingBbox);
        }
        let malformed = || SkipReason::MalformedBbox(value.to_string());
        let coords: Vec<f64> = match items.len() {
            4 => items.iter().map(Value::as_f64).collect::<Option<_>>().ok_or_else(malformed)?,
            2 => {
                let mut flat = Vec::with_capacity(4);
                for corner in items {
                    let pair = corner.as_array().filter(|p| p.len() == 2).ok_or_else(malformed)?;
                    for c in pair { flat.push(c.as_f64().ok_or_else(malformed)?); }
                }
                flat
            }
            _ => return Err(malformed()),
        };
        Ok(Self::new(coords[0], coords[1], coords[2], coords[3]))
    }
}

/// Temporal coverage. Either end may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeExtent {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeExtent {
    #[must_use]
    pub const fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Earliest start and latest end of both extents.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let pick = |a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>, f: fn(DateTime<Utc>, DateTime<Utc>) -> DateTime<Utc>| match (a, b) {
            (Some(a), Some(b)) => Some(f(a, b)),
            (a, b) => a.or(b),
        };
        Self { start: pick(self.start, other.start, std::cmp::min), end: pick(self.end, other.end, std::cmp::max) }
    }

    fn to_value(self) -> Value {
        let ts = |t: Option<DateTime<Utc>>| t.map_or(Value::Null, |t| Value::String(t.to_rfc3339()));
        json!([ts(self.start), ts(self.end)])
    }

    fn from_value(value: &Value) -> Option<Self> {
        let items = value.as_array().filter(|a| a.len() == 2)?;
        let ts = |v: &Value| v.as_str().and_then(parse_timestamp);
        Some(Self::new(ts(&items[0]), ts(&items[1]))).filter(|t| !t.is_empty())
    }
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as UTC midnight).
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) { return Some(t.with_timezone(&Utc)); }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0).map(|t| t.and_utc())
}

/// A file attached to a record, as listed in the record's `_files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub file_id: String,
    pub file_type: Option<String>,
}

/// What the per-file extractor found for one file.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FileMetadata {
    pub bbox: Option<BoundingBox>,
    pub time: Option<TimeExtent>,
}

/// Record-level spatial/temporal summary produced by the aggregator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordSpatialSummary {
    pub bbox: Option<BoundingBox>,
    pub time_extent: Option<TimeExtent>,
    pub dominant_file_type: Option<String>,
}

impl RecordSpatialSummary {
    #[must_use]
    pub fn empty() -> Self { Self::default() }

    /// Positional layout stored under the document's `bbox` key:
    /// `[box | [null], [null], [start, end] | [null]]`. The middle slot is
    /// reserved for a convex hull and always empty.
    #[must_use]
    pub fn to_index_value(&self) -> Value {
        let bbox = self.bbox.map_or_else(|| json!([null]), |b| json!(b.to_array()));
        let time = self.time_extent.map_or_else(|| json!([null]), TimeExtent::to_value);
        json!([bbox, [null], time])
    }

    /// Inverse of [`Self::to_index_value`]. The dominant file type is not
    /// part of the stored layout and is left unset.
    pub fn from_index_value(value: &Value) -> Result<Self, SkipReason> {
        let slots = match value {
            Value::Null => return Err(SkipReason::MissingBbox),
            Value::Array(slots) if !slots.is_empty() => slots,
            other => return Err(SkipReason::MalformedBbox(other.to_string())),
        };
        let bbox = match BoundingBox::from_value(&slots[0]) {
            Ok(b) => Some(b),
            Err(SkipReason::MissingBbox) => None,
            Err(e) => return Err(e),
        };
        let time_extent = slots.get(2).and_then(TimeExtent::from_value);
        Ok(Self { bbox, time_extent, dominant_file_type: None })
    }
}

/// Read-only projection of a pool record used for ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub id: RecordId,
    pub display_name: String,
    /// The stored summary's box; candidates without one are never built.
    pub bbox: BoundingBox,
    pub file_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    pub candidate_id: RecordId,
    pub display_name: String,
    pub candidate_bbox: BoundingBox,
    pub candidate_file_type: String,
    pub score: f64,
}

/// Ranked matches for one target record; `similar` is ordered by score, descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityReport {
    pub target_record_id: RecordId,
    pub similar: Vec<SimilarityResult>,
}

impl SimilarityReport {
    #[must_use]
    pub fn empty(target_record_id: impl Into<RecordId>) -> Self {
        Self { target_record_id: target_record_id.into(), similar: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_is_coordinate_wise_min_max() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(2.0, 2.0, 3.0, 3.0);
        assert_eq!(a.union(&b), BoundingBox::new(0.0, 0.0, 3.0, 3.0));
    }

    #[test]
    fn parses_both_box_shapes_and_rejects_markers() {
        let flat = BoundingBox::from_value(&json!([1.0, 2.0, 3.0, 4.0])).unwrap();
        let pairs = BoundingBox::from_value(&json!([[1.0, 2.0], [3.0, 4.0]])).unwrap();
        assert_eq!(flat, pairs);
        assert_eq!(BoundingBox::from_value(&json!([null])), Err(SkipReason::MissingBbox));
        assert_eq!(BoundingBox::from_value(&json!([])), Err(SkipReason::MissingBbox));
        assert!(matches!(BoundingBox::from_value(&json!([1.0, "x", 3.0, 4.0])), Err(SkipReason::MalformedBbox(_))));
        assert!(matches!(BoundingBox::from_value(&json!([1.0, 2.0, 3.0])), Err(SkipReason::MalformedBbox(_))));
    }

    #[test]
    fn zero_box_is_a_valid_point() {
        let zero = RecordSpatialSummary { bbox: Some(BoundingBox::new(0.0, 0.0, 0.0, 0.0)), ..Default::default() };
        let stored = zero.to_index_value();
        assert_eq!(stored[0], json!([0.0, 0.0, 0.0, 0.0]));
        assert_eq!(RecordSpatialSummary::from_index_value(&stored).unwrap().bbox, zero.bbox);
        let none = RecordSpatialSummary::empty().to_index_value();
        assert_eq!(none, json!([[null], [null], [null]]));
        assert_eq!(RecordSpatialSummary::from_index_value(&none).unwrap().bbox, None);
    }

    #[test]
    fn merge_keeps_known_ends() {
        let d = |s: &str| parse_timestamp(s);
        let a = TimeExtent::new(d("2018-01-03"), None);
        let b = TimeExtent::new(d("2018-01-01"), d("2018-01-05"));
        assert_eq!(a.merge(&b), TimeExtent::new(d("2018-01-01"), d("2018-01-05")));
    }
}
