//! File extractor backed by JSON sidecars stored next to each payload.
//!
//! For a payload at `.../data` the sidecar is `.../data.geo.json`:
//!
//! ```json
//! { "bbox": [7.0, 51.0, 8.0, 52.0], "temporal": ["2018-01-01", "2018-03-31T12:00:00Z"] }
//! ```
//!
//! Both keys are optional. A payload without a sidecar carries no metadata.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use geosim_core::traits::FileExtractor;
use geosim_core::types::parse_timestamp;
use geosim_core::{BoundingBox, FileMetadata, TimeExtent};

pub const SIDECAR_EXTENSION: &str = "geo.json";

#[derive(Debug, Deserialize)]
struct Sidecar {
    #[serde(default)]
    bbox: Option<[f64; 4]>,
    #[serde(default)]
    temporal: Option<[Option<String>; 2]>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SidecarExtractor;

impl SidecarExtractor {
    pub fn new() -> Self { Self }

    pub fn sidecar_path(data_path: &Path) -> PathBuf { data_path.with_extension(SIDECAR_EXTENSION) }
}

impl FileExtractor for SidecarExtractor {
    fn extract(&self, path: &Path) -> Result<FileMetadata> {
        let sidecar_path = Self::sidecar_path(path);
        if !sidecar_path.exists() { return Ok(FileMetadata::default()); }
        let raw = fs::read_to_string(&sidecar_path).with_context(|| format!("reading {}", sidecar_path.display()))?;
        let sidecar: Sidecar = serde_json::from_str(&raw).with_context(|| format!("parsing {}", sidecar_path.display()))?;

        let bbox = sidecar.bbox.map(|[a, b, c, d]| BoundingBox::new(a, b, c, d));
        if let Some(b) = bbox.filter(|b| !b.is_finite()) {
            return Err(anyhow!("non-finite bbox {:?} in {}", b.to_array(), sidecar_path.display()));
        }
        let time = match sidecar.temporal {
            None => None,
            Some([start, end]) => {
                let ts = |s: Option<String>| -> Result<_> {
                    s.map(|s| parse_timestamp(&s).ok_or_else(|| anyhow!("bad timestamp {s:?} in {}", sidecar_path.display()))).transpose()
                };
                Some(TimeExtent::new(ts(start)?, ts(end)?)).filter(|t| !t.is_empty())
            }
        };
        Ok(FileMetadata { bbox, time })
    }
}
