//! Preconditions for starting a main job.

use crate::error::{Result, ValidationError};
use crate::options::OutputOptions;
use std::path::{Path, PathBuf};

const WRITE_PROBE_NAME: &str = ".ytdlpf-write-probe";

/// Check the output directory and return the effective one
///
/// The base directory must already exist. When a subdirectory is configured it is
/// created on demand. The effective directory must accept a new file.
pub(crate) async fn prepare_output_dir(output: &OutputOptions) -> Result<PathBuf> {
    let base = output.output_dir.trim();
    if base.is_empty() {
        return Err(ValidationError::MissingOutputDir.into());
    }
    let base = PathBuf::from(base);
    if !tokio::fs::try_exists(&base).await.unwrap_or(false) {
        return Err(ValidationError::OutputDirNotFound { path: base }.into());
    }

    let effective = match output.effective_subdir() {
        Some(subdir) => base.join(subdir),
        None => base,
    };

    if !tokio::fs::try_exists(&effective).await.unwrap_or(false) {
        tokio::fs::create_dir_all(&effective).await.map_err(|e| {
            ValidationError::OutputDirCreateFailed {
                path: effective.clone(),
                reason: e.to_string(),
            }
        })?;
        tracing::info!(path = %effective.display(), "Created output subdirectory");
    }

    if !is_writable(&effective).await {
        return Err(ValidationError::OutputDirNotWritable { path: effective }.into());
    }

    Ok(effective)
}

async fn is_writable(dir: &Path) -> bool {
    let probe = dir.join(format!("{}-{}", WRITE_PROBE_NAME, std::process::id()));
    match tokio::fs::write(&probe, b"").await {
        Ok(()) => {
            if let Err(e) = tokio::fs::remove_file(&probe).await {
                tracing::warn!(path = %probe.display(), error = %e, "Failed to remove write probe");
            }
            true
        }
        Err(e) => {
            tracing::debug!(path = %dir.display(), error = %e, "Output directory is not writable");
            false
        }
    }
}
