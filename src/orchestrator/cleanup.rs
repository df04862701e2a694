//! Removal of a cancelled job's files.
//!
//! Two passes, both best-effort: every path the tool announced, then every
//! partial-download file directly inside the effective output directory that was
//! created after the job started. Files that predate the job are never touched.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Delete `artifacts` and new partial files in `output_dir`
///
/// Returns the paths that were actually removed, in removal order.
pub(crate) async fn remove_job_files(
    artifacts: &[PathBuf],
    output_dir: &Path,
    partial_extension: &str,
    started_at: SystemTime,
) -> Vec<PathBuf> {
    let mut deleted = Vec::new();

    for path in artifacts {
        if remove(path).await {
            deleted.push(path.clone());
        }
    }

    for path in new_partial_files(output_dir, partial_extension, started_at).await {
        if !deleted.contains(&path) && remove(&path).await {
            deleted.push(path);
        }
    }

    tracing::info!(
        count = deleted.len(),
        dir = %output_dir.display(),
        "Cleaned up cancelled job"
    );
    deleted
}

async fn remove(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Deleted file");
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to delete file");
            false
        }
    }
}

/// Partial files in `dir` (not recursive) created at or after `since`
///
/// Birth time is used where the platform reports it, modification time otherwise.
pub(crate) async fn new_partial_files(
    dir: &Path,
    partial_extension: &str,
    since: SystemTime,
) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Failed to scan output directory");
            return found;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Failed to read directory entry");
                break;
            }
        };
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != partial_extension) {
            continue;
        }
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let stamp = metadata.created().or_else(|_| metadata.modified());
        if matches!(stamp, Ok(stamp) if stamp >= since) {
            found.push(path);
        }
    }

    found.sort();
    found
}
