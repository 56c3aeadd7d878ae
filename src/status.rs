//! Artifact listing backing the `status` command
//!
//! Pure read/format: scans a directory of persisted benchmark records and
//! returns the newest ones for display. Never mutates an artifact.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::Result;
use crate::record::BenchmarkRecord;

/// One entry in a status listing
#[derive(Debug)]
pub struct StatusEntry {
    /// Artifact path
    pub path: PathBuf,
    /// Parsed record, or the parse error kept for display
    pub record: std::result::Result<BenchmarkRecord, String>,
}

/// List the newest benchmark artifacts in `dir`, newest first.
///
/// The directory is created when missing so `status` works before the
/// first benchmark has run. A file that fails to parse is returned with
/// its error instead of aborting the whole listing.
pub fn latest_records(dir: &Path, limit: usize) -> Result<Vec<StatusEntry>> {
    fs::create_dir_all(dir)?;

    let mut files: Vec<(PathBuf, SystemTime)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((path, modified));
    }

    files.sort_by(|a, b| b.1.cmp(&a.1));
    files.truncate(limit);

    Ok(files
        .into_iter()
        .map(|(path, _)| {
            let record = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()));
            StatusEntry { path, record }
        })
        .collect())
}
