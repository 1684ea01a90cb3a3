use anyhow::{bail, Result};

use geosim_core::traits::GeometryScorer;
use geosim_core::BoundingBox;

/// Reference scorer: area overlap (intersection over union) blended with a
/// file-type match.
///
/// `score = (1 - type_weight) * iou + type_weight * same_type`, in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct OverlapScorer {
    type_weight: f64,
}

impl OverlapScorer {
    pub fn new(type_weight: f64) -> Self { Self { type_weight: type_weight.clamp(0.0, 1.0) } }

    pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
        let inter = a.intersection(b);
        let union = a.area() + b.area() - inter.map_or(0.0, |i| i.area());
        if union > 0.0 {
            inter.map_or(0.0, |i| i.area()) / union
        } else if a == b {
            // identical points or lines
            1.0
        } else {
            0.0
        }
    }
}

impl Default for OverlapScorer {
    fn default() -> Self { Self::new(geosim_core::config::DEFAULT_TYPE_WEIGHT) }
}

impl GeometryScorer for OverlapScorer {
    fn score(&self, candidate: &BoundingBox, target: &BoundingBox, candidate_type: &str, target_type: &str) -> Result<f64> {
        if !candidate.is_finite() || !target.is_finite() {
            bail!("non-finite coordinates: {:?} vs {:?}", candidate.to_array(), target.to_array());
        }
        let same_type = if candidate_type.eq_ignore_ascii_case(target_type) { 1.0 } else { 0.0 };
        Ok((1.0 - self.type_weight) * Self::iou(candidate, target) + self.type_weight * same_type)
    }
}
