use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use serde_json::json;
use tempfile::TempDir;

use geosim_aggregate::{Aggregator, IndexingHook, SidecarExtractor};
use geosim_core::traits::FileExtractor;
use geosim_core::types::parse_timestamp;
use geosim_core::{BoundingBox, FileMetadata, FileRef, RawRecord, SkipReason, TimeExtent};

/// Extractor answering from a fixed table keyed by payload path; unknown
/// paths have no metadata, paths mapped to `None` fail.
struct TableExtractor(HashMap<PathBuf, Option<FileMetadata>>);

impl FileExtractor for TableExtractor {
    fn extract(&self, path: &Path) -> anyhow::Result<FileMetadata> {
        match self.0.get(path) {
            Some(Some(m)) => Ok(*m),
            Some(None) => Err(anyhow!("corrupt file at {}", path.display())),
            None => Ok(FileMetadata::default()),
        }
    }
}

fn file(id: &str, ty: &str) -> FileRef {
    FileRef { file_id: id.to_string(), file_type: Some(ty.to_string()) }
}

fn payload(id: &str) -> PathBuf {
    PathBuf::from("/data").join(&id[..2]).join(&id[2..4]).join(&id[4..]).join("data")
}

fn meta(b: [f64; 4], t: Option<(&str, &str)>) -> FileMetadata {
    FileMetadata {
        bbox: Some(BoundingBox::new(b[0], b[1], b[2], b[3])),
        time: t.map(|(s, e)| TimeExtent::new(parse_timestamp(s), parse_timestamp(e))),
    }
}

fn five_files() -> (Vec<FileRef>, HashMap<PathBuf, Option<FileMetadata>>) {
    let ids = ["aa11f001", "aa11f002", "aa11f003", "aa11f004", "aa11f005"];
    let files = ids.iter().map(|id| file(id, "tif")).collect();
    let mut table = HashMap::new();
    table.insert(payload(ids[0]), Some(meta([0.0, 0.0, 1.0, 1.0], Some(("2018-01-01", "2018-01-05")))));
    table.insert(payload(ids[1]), Some(meta([2.0, 2.0, 3.0, 3.0], Some(("2018-01-03", "2018-01-10")))));
    table.insert(payload(ids[2]), Some(meta([-1.0, 0.5, 0.5, 2.0], None)));
    table.insert(payload(ids[3]), Some(meta([1.0, -4.0, 2.0, 0.0], None)));
    table.insert(payload(ids[4]), Some(meta([5.0, 5.0, 6.0, 6.0], Some(("2017-12-24", "2018-01-02")))));
    (files, table)
}

#[test]
fn box_and_time_fold_across_files() {
    let (files, table) = five_files();
    let agg = Aggregator::new(TableExtractor(table), "/data");
    let summary = agg.aggregate(&files);
    assert_eq!(summary.bbox, Some(BoundingBox::new(-1.0, -4.0, 6.0, 6.0)));
    let t = summary.time_extent.expect("time extent");
    assert_eq!(t.start, parse_timestamp("2017-12-24"));
    assert_eq!(t.end, parse_timestamp("2018-01-10"));
    assert_eq!(summary.dominant_file_type.as_deref(), Some("tif"));
}

#[test]
fn one_failing_file_among_five_does_not_change_the_rest() {
    let (files, mut table) = five_files();
    let healthy: Vec<FileRef> = files.iter().filter(|f| f.file_id != "aa11f005").cloned().collect();
    let expected = Aggregator::new(TableExtractor(table.clone()), "/data").aggregate(&healthy);

    table.insert(payload("aa11f005"), None);
    let out = Aggregator::new(TableExtractor(table), "/data").aggregate_with_log(&files);
    assert_eq!(out.summary.bbox, expected.bbox);
    assert_eq!(out.summary.time_extent, expected.time_extent);
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].item, "aa11f005");
    assert!(matches!(out.skipped[0].reason, SkipReason::Extraction(_)));
}

#[test]
fn every_file_failing_still_yields_a_summary() {
    let (files, table) = five_files();
    let broken = table.into_keys().map(|k| (k, None)).collect();
    let out = Aggregator::new(TableExtractor(broken), "/data").aggregate_with_log(&files);
    assert_eq!(out.summary.bbox, None);
    assert_eq!(out.summary.time_extent, None);
    assert_eq!(out.skipped.len(), 5);
}

#[test]
fn no_files_means_no_box() {
    let agg = Aggregator::new(TableExtractor(HashMap::new()), "/data");
    let summary = agg.aggregate(&[]);
    assert_eq!(summary.bbox, None);
    assert_eq!(summary.time_extent, None);
    assert_eq!(summary.dominant_file_type, None);
}

#[test]
fn reaggregation_is_idempotent() {
    let (files, table) = five_files();
    let agg = Aggregator::new(TableExtractor(table), "/data");
    assert_eq!(agg.aggregate(&files), agg.aggregate(&files));
}

#[test]
fn unusable_file_id_is_skipped() {
    let (mut files, table) = five_files();
    files.push(file("ab", "csv"));
    let out = Aggregator::new(TableExtractor(table), "/data").aggregate_with_log(&files);
    assert_eq!(out.skipped.len(), 1);
    assert!(matches!(out.skipped[0].reason, SkipReason::MalformedFileRef(_)));
    assert!(out.summary.bbox.is_some());
}

fn write_sidecar(root: &Path, id: &str, body: &str) {
    let dir = root.join(&id[..2]).join(&id[2..4]).join(&id[4..]);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("data"), b"payload").unwrap();
    fs::write(dir.join("data.geo.json"), body).unwrap();
}

#[test]
fn sidecar_extractor_reads_box_and_interval() {
    let tmp = TempDir::new().unwrap();
    write_sidecar(tmp.path(), "0a1b2c3d", r#"{ "bbox": [7.0, 51.0, 8.0, 52.0], "temporal": ["2018-01-01", null] }"#);
    let path = geosim_aggregate::path::storage_path(tmp.path(), "0a1b2c3d").unwrap();
    let m = SidecarExtractor::new().extract(&path).expect("extract");
    assert_eq!(m.bbox, Some(BoundingBox::new(7.0, 51.0, 8.0, 52.0)));
    assert_eq!(m.time, Some(TimeExtent::new(parse_timestamp("2018-01-01"), None)));
}

#[test]
fn sidecar_extractor_missing_and_broken() {
    let tmp = TempDir::new().unwrap();
    let missing = SidecarExtractor::new().extract(&tmp.path().join("nothing/data")).expect("no sidecar is no data");
    assert_eq!(missing, FileMetadata::default());

    write_sidecar(tmp.path(), "ffee0011", "{ not json");
    let path = geosim_aggregate::path::storage_path(tmp.path(), "ffee0011").unwrap();
    assert!(SidecarExtractor::new().extract(&path).is_err());
}

#[test]
fn hook_writes_summary_and_file_stats() {
    let tmp = TempDir::new().unwrap();
    write_sidecar(tmp.path(), "0a1b2c3d", r#"{ "bbox": [0, 0, 1, 1], "temporal": ["2018-01-01", "2018-01-05"] }"#);
    write_sidecar(tmp.path(), "0a1b9999", r#"{ "bbox": [2, 2, 3, 3], "temporal": ["2018-01-03", "2018-01-10"] }"#);
    write_sidecar(tmp.path(), "0a1bdead", "garbage");
    let hook = IndexingHook::new(Aggregator::new(SidecarExtractor::new(), tmp.path()));

    let mut doc = json!({
        "recid": 12,
        "_files": [
            { "file_id": "0a1b2c3d", "type": "geojson", "size": 100 },
            { "file_id": "0a1b9999", "type": "csv", "size": 50 },
            { "file_id": "0a1bdead", "type": "csv" },
        ]
    });
    let out = hook.on_index(doc.as_object_mut().unwrap());
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(doc["bbox"][0], json!([0.0, 0.0, 3.0, 3.0]));
    assert_eq!(doc["bbox"][1], json!([null]));
    assert_eq!(doc["bbox"][2][0], "2018-01-01T00:00:00+00:00");
    assert_eq!(doc["bbox"][2][1], "2018-01-10T00:00:00+00:00");
    assert_eq!(doc["filecount"], 3);
    assert_eq!(doc["size"], 150);
}

#[test]
fn hook_tolerates_odd_optional_file_fields() {
    let tmp = TempDir::new().unwrap();
    write_sidecar(tmp.path(), "0a1b2c3d", r#"{ "bbox": [0, 0, 1, 1] }"#);
    write_sidecar(tmp.path(), "0a1b9999", r#"{ "bbox": [2, 2, 3, 3] }"#);
    write_sidecar(tmp.path(), "0a1b7777", r#"{ "bbox": [-1, -1, 0, 0] }"#);
    let hook = IndexingHook::new(Aggregator::new(SidecarExtractor::new(), tmp.path()));

    let mut doc = json!({
        "recid": 13,
        "_files": [
            { "file_id": "0a1b2c3d", "type": "csv", "size": null },
            { "file_id": "0a1b9999", "type": "csv", "size": 2.5 },
            { "file_id": "0a1b7777", "type": 42 },
        ]
    });
    let out = hook.on_index(doc.as_object_mut().unwrap());
    assert!(out.skipped.is_empty());
    assert_eq!(doc["bbox"][0], json!([-1.0, -1.0, 3.0, 3.0]));
    assert_eq!(doc["filecount"], 3);
    assert_eq!(doc["size"], 0);
}

#[test]
fn dominant_type_matches_what_the_ranker_reads() {
    let tmp = TempDir::new().unwrap();
    write_sidecar(tmp.path(), "0a1b2c3d", r#"{ "bbox": [0, 0, 1, 1] }"#);
    let hook = IndexingHook::new(Aggregator::new(SidecarExtractor::new(), tmp.path()));

    // first entry is unusable but still declares the record's type
    let mut doc = json!({
        "recid": 14,
        "_files": [
            { "type": "shp" },
            { "file_id": "0a1b2c3d", "type": "csv" },
        ]
    });
    let out = hook.on_index(doc.as_object_mut().unwrap());
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.summary.dominant_file_type.as_deref(), Some("shp"));
    let stored = RawRecord::new(doc).summary().expect("stored summary");
    assert_eq!(stored.dominant_file_type, out.summary.dominant_file_type);
    assert_eq!(stored.bbox, out.summary.bbox);
}

#[test]
fn hook_stores_empty_summary_for_malformed_file_list() {
    let hook = IndexingHook::new(Aggregator::new(TableExtractor(HashMap::new()), "/data"));
    let mut doc = json!({ "recid": 1, "_files": "oops" });
    let out = hook.on_index(doc.as_object_mut().unwrap());
    assert_eq!(out.summary.bbox, None);
    assert_eq!(doc["bbox"], json!([[null], [null], [null]]));
    assert_eq!(doc["filecount"], 0);
}
