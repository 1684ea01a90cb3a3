#![deny(dead_code)]

//! geosim-similarity
//!
//! Ranks recent records by spatial similarity to a target record. The
//! pipeline is collect → score → rank → report; see [`SimilarityEngine`].

pub mod collect;
pub mod rank;
pub mod report;
pub mod scorer;
pub mod source;

use geosim_core::config::SimilaritySettings;
use geosim_core::traits::{CandidateSource, GeometryScorer};
use geosim_core::{SimilarityReport, Skipped};

pub use collect::collect_candidates;
pub use rank::{rank, resolve_output_size, score_candidates};
pub use scorer::OverlapScorer;
pub use source::SnapshotSource;

/// Report plus every candidate dropped on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityOutcome {
    pub report: SimilarityReport,
    pub skipped: Vec<Skipped>,
}

pub struct SimilarityEngine<S> where S: CandidateSource {
    source: S,
    scorer: Box<dyn GeometryScorer>,
    settings: SimilaritySettings,
}

impl<S> SimilarityEngine<S> where S: CandidateSource {
    pub fn new(source: S, scorer: Box<dyn GeometryScorer>, settings: SimilaritySettings) -> Self { Self { source, scorer, settings } }

    pub fn similar(&self, target_id: &str, size_hint: Option<&str>) -> SimilarityReport { self.similar_with_log(target_id, size_hint).report }

    /// Always produces a report; a missing target, a target without a box or
    /// an unavailable pool all yield an empty one.
    pub fn similar_with_log(&self, target_id: &str, size_hint: Option<&str>) -> SimilarityOutcome {
        let output_size = resolve_output_size(size_hint, self.settings.default_size);
        let empty = || SimilarityOutcome { report: SimilarityReport::empty(target_id), skipped: Vec::new() };

        let target = match self.source.fetch(target_id) {
            Ok(Some(t)) => t,
            Ok(None) => { tracing::warn!(record = %target_id, "Target record not found."); return empty(); }
            Err(e) => { tracing::warn!(record = %target_id, error = %e, "Target lookup failed."); return empty(); }
        };
        let target_summary = match target.summary() {
            Ok(s) => s,
            Err(reason) => { tracing::warn!(record = %target_id, %reason, "Target has no usable bounding box."); return empty(); }
        };
        let Some(target_bbox) = target_summary.bbox else {
            tracing::warn!(record = %target_id, "Target has no bounding box.");
            return empty();
        };
        let target_type = target_summary.dominant_file_type.unwrap_or_default();

        let pool = self.source.recent(self.settings.pool_limit).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Recent-records listing failed; ranking an empty pool.");
            Vec::new()
        });
        let (candidates, mut skipped) = collect_candidates(&pool, target_id);
        let (scored, mut dropped) = score_candidates(candidates, &target_bbox, &target_type, self.scorer.as_ref());
        skipped.append(&mut dropped);
        let report = rank(target_id, scored, output_size);
        tracing::info!(record = %target_id, pool = pool.len(), returned = report.similar.len(), skipped = skipped.len(), output_size, "Ranked similar records.");
        SimilarityOutcome { report, skipped }
    }
}
