//! JSON rendering of similarity reports.

use serde_json::{json, Value};

use geosim_core::{BoundingBox, SimilarityReport, SimilarityResult};

/// GeoJSON polygon feature covering `bbox`.
pub fn polygon_feature(bbox: &BoundingBox) -> Value {
    json!({ "type": "Feature", "geometry": { "type": "Polygon", "coordinates": [bbox.ring()] } })
}

fn render_match(r: &SimilarityResult) -> Value {
    json!({
        "match": [
            { "id": r.candidate_id },
            { "name": r.display_name },
            polygon_feature(&r.candidate_bbox),
            { "filetype": r.candidate_file_type },
            { "sim_value": r.score },
        ]
    })
}

/// `{ "record": <target>, "similar": [ { "match": [ ... ] }, ... ] }`
pub fn to_json(report: &SimilarityReport) -> Value {
    json!({
        "record": report.target_record_id,
        "similar": report.similar.iter().map(render_match).collect::<Vec<_>>(),
    })
}
