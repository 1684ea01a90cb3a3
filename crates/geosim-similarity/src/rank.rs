//! Scoring, ordering and truncation of candidates.

use std::cmp::Ordering;

use geosim_core::traits::GeometryScorer;
use geosim_core::{BoundingBox, CandidateRecord, SimilarityReport, SimilarityResult, SkipReason, Skipped};

/// Resolve the caller's output-size hint.
///
/// Absent, non-numeric or otherwise unclean values (signs, whitespace,
/// decimals) fall back to `default`. Values at or above `default` collapse
/// to `default`; smaller values, including `0`, are honored as given.
pub fn resolve_output_size(hint: Option<&str>, default: usize) -> usize {
    let Some(raw) = hint else { return default };
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) { return default; }
    match raw.parse::<usize>() {
        Ok(n) if n < default => n,
        _ => default,
    }
}

/// Score every candidate against the target. Scorer errors and non-finite
/// scores drop that candidate only.
pub fn score_candidates<S>(candidates: Vec<CandidateRecord>, target_bbox: &BoundingBox, target_type: &str, scorer: &S) -> (Vec<(CandidateRecord, f64)>, Vec<Skipped>)
where
    S: GeometryScorer + ?Sized,
{
    let mut scored = Vec::with_capacity(candidates.len());
    let mut skipped = Vec::new();
    for c in candidates {
        let reason = match scorer.score(&c.bbox, target_bbox, &c.file_type, target_type) {
            Ok(s) if s.is_finite() => { scored.push((c, s)); continue; }
            Ok(s) => SkipReason::NonFiniteScore(s),
            Err(e) => SkipReason::Scoring(format!("{e:#}")),
        };
        tracing::warn!(record = %c.id, %reason, "Dropping candidate from ranking.");
        skipped.push(Skipped::new(c.id, reason));
    }
    (scored, skipped)
}

/// Stable sort by score, descending, then keep the first `output_size`.
/// Equal scores keep their pool order.
pub fn rank(target_id: &str, mut scored: Vec<(CandidateRecord, f64)>, output_size: usize) -> SimilarityReport {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(output_size);
    let similar = scored
        .into_iter()
        .map(|(c, score)| SimilarityResult {
            candidate_id: c.id,
            display_name: c.display_name,
            candidate_bbox: c.bbox,
            candidate_file_type: c.file_type,
            score,
        })
        .collect();
    SimilarityReport { target_record_id: target_id.to_string(), similar }
}
