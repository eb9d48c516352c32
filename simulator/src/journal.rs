//! Per-device JSON log of every generated reading.

use crate::reading::Reading;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

pub fn journal_path(dir: &Path, device_id: &str) -> PathBuf {
    dir.join(format!("{}_log.json", device_id))
}

/// Appends `reading` to `<dir>/<device_id>_log.json`. A missing or unreadable
/// log starts a new array.
pub fn append(dir: &Path, reading: &Reading) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;
    let path = journal_path(dir, &reading.device_id);

    let mut log: Vec<Reading> = match fs::read(&path) {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!("Starting a new log, {} is not valid: {}", path.display(), e);
            Vec::new()
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    log.push(reading.clone());
    fs::write(&path, serde_json::to_vec_pretty(&log)?)?;
    Ok(())
}
