//! Turns the raw recent-records pool into rankable candidates.

use geosim_core::{CandidateRecord, RawRecord, SkipReason, Skipped};

/// Keep records that have an id other than `target_id`, a well-formed stored
/// box, and a file type. Everything else is skipped individually.
pub fn collect_candidates(pool: &[RawRecord], target_id: &str) -> (Vec<CandidateRecord>, Vec<Skipped>) {
    let mut kept = Vec::with_capacity(pool.len());
    let mut skipped = Vec::new();
    for (i, raw) in pool.iter().enumerate() {
        match candidate(raw, target_id) {
            Ok(c) => kept.push(c),
            Err(reason) => {
                let item = raw.id().unwrap_or_else(|| format!("pool[{i}]"));
                if reason == SkipReason::SelfMatch {
                    tracing::debug!(record = %item, "Excluding target from its own pool.");
                } else {
                    tracing::warn!(record = %item, %reason, "Skipping candidate.");
                }
                skipped.push(Skipped::new(item, reason));
            }
        }
    }
    tracing::debug!(pool = pool.len(), kept = kept.len(), skipped = skipped.len(), "Collected candidates.");
    (kept, skipped)
}

fn candidate(raw: &RawRecord, target_id: &str) -> Result<CandidateRecord, SkipReason> {
    let id = raw.id().ok_or(SkipReason::MissingId)?;
    if id == target_id { return Err(SkipReason::SelfMatch); }
    let summary = raw.summary()?;
    let bbox = summary.bbox.ok_or(SkipReason::MissingBbox)?;
    let file_type = summary.dominant_file_type.ok_or(SkipReason::MissingFileType)?;
    let display_name = raw.title().map_or_else(|| id.clone(), str::to_owned);
    Ok(CandidateRecord { id, display_name, bbox, file_type })
}
