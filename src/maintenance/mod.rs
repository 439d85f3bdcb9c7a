// Upload directory maintenance
//
// Session cleanup deletes image files when it can, but crashes and missed
// timers leave orphans behind. This sweep walks the upload directory and
// removes image files older than a cutoff.

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Outcome of one cleanup pass
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupReport {
    /// Image files seen
    pub scanned: usize,
    /// Files removed
    pub deleted: usize,
    /// Files that could not be removed
    pub failed: usize,
}

/// Delete image files under `dir` whose modification time is older than
/// `max_age_hours`. Non-image files and subdirectory structure are left
/// alone; individual failures are logged and counted, never fatal.
pub fn cleanup_old_images(dir: &Path, max_age_hours: i64) -> Result<CleanupReport> {
    if !dir.exists() {
        return Ok(CleanupReport::default());
    }

    let cutoff = Utc::now()
        - Duration::try_hours(max_age_hours)
            .ok_or_else(|| anyhow!("Invalid max age: {} hours", max_age_hours))?;
    let cutoff: SystemTime = cutoff.into();

    let mut report = CleanupReport::default();

    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_image = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !is_image {
            continue;
        }

        report.scanned += 1;

        let modified = match entry.path().metadata().and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                log::warn!(
                    "Skipping '{}', no modification time: {}",
                    entry.path().display(),
                    e
                );
                report.failed += 1;
                continue;
            }
        };

        if modified >= cutoff {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => {
                log::debug!("Removed stale image: {}", entry.path().display());
                report.deleted += 1;
            }
            Err(e) => {
                log::warn!("Failed to remove '{}': {}", entry.path().display(), e);
                report.failed += 1;
            }
        }
    }

    if report.deleted > 0 {
        log::info!(
            "Image cleanup removed {} of {} files under {}",
            report.deleted,
            report.scanned,
            dir.display()
        );
    }

    Ok(report)
}
