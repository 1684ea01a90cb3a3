//! Storage layout of file payloads: `<root>/<id[0..2]>/<id[2..4]>/<id[4..]>/data`.

use std::path::{Path, PathBuf};

use geosim_core::SkipReason;

pub const DATA_LEAF: &str = "data";

pub fn storage_path(root: &Path, file_id: &str) -> Result<PathBuf, SkipReason> {
    let malformed = || SkipReason::MalformedFileRef(format!("unusable file id {file_id:?}"));
    if file_id.contains(['/', '\\']) { return Err(malformed()); }
    let (first, second, rest) = match (file_id.get(..2), file_id.get(2..4), file_id.get(4..)) {
        (Some(a), Some(b), Some(c)) if !c.is_empty() => (a, b, c),
        _ => return Err(malformed()),
    };
    Ok(root.join(first).join(second).join(rest).join(DATA_LEAF))
}
