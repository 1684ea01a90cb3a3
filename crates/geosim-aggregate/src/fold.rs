//! Min/max fold of per-file boxes and time intervals.

use geosim_core::{BoundingBox, FileMetadata, TimeExtent};

/// Running union of everything seen so far. Starts empty; an empty fold
/// yields no box and no extent rather than a zero box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpatialFold {
    bbox: Option<BoundingBox>,
    time: Option<TimeExtent>,
}

impl SpatialFold {
    pub fn push(&mut self, meta: &FileMetadata) {
        if let Some(b) = meta.bbox {
            self.bbox = Some(self.bbox.map_or(b, |acc| acc.union(&b)));
        }
        if let Some(t) = meta.time.filter(|t| !t.is_empty()) {
            self.time = Some(self.time.map_or(t, |acc| acc.merge(&t)));
        }
    }

    pub fn bbox(&self) -> Option<BoundingBox> { self.bbox }

    pub fn time(&self) -> Option<TimeExtent> { self.time }
}

impl<'a> FromIterator<&'a FileMetadata> for SpatialFold {
    fn from_iter<I: IntoIterator<Item = &'a FileMetadata>>(iter: I) -> Self {
        let mut acc = Self::default();
        for m in iter { acc.push(m); }
        acc
    }
}
