//! Cancellation and shutdown coordination.

use crate::error::Result;
use crate::types::Event;

use super::Orchestrator;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Extra time shutdown allows on top of the cancel grace period for cleanup
const SHUTDOWN_CLEANUP_MARGIN: Duration = Duration::from_secs(5);

impl Orchestrator {
    /// Cancel the active main job
    ///
    /// Signals the job, which terminates its process, waits up to the configured
    /// grace period and deletes the job's files. Returns once that cleanup has
    /// finished and the state is back to `Idle`, or `false` at once when no main job
    /// is active.
    pub async fn cancel(&self) -> bool {
        let job = {
            let active = self.active.lock().await;
            active
                .as_ref()
                .map(|job| (job.id, job.cancel.clone(), job.finished.clone()))
        };
        let Some((id, cancel, finished)) = job else {
            tracing::debug!("Cancel requested with no active download");
            return false;
        };

        tracing::info!(job_id = id.0, "Cancel requested");
        cancel.cancel();
        finished.cancelled().await;
        true
    }

    /// Wait until the active main job (if any) has finished on its own or been cancelled
    pub async fn wait_for_job(&self) {
        let finished = {
            let active = self.active.lock().await;
            active.as_ref().map(|job| job.finished.clone())
        };
        if let Some(finished) = finished {
            finished.cancelled().await;
        }
    }

    /// Gracefully shut down the orchestrator
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting new main jobs
    /// 2. Cancels the active main job, if any, including its cleanup
    /// 3. Emits [`Event::Shutdown`]
    ///
    /// Listing jobs are owned by their callers and are not waited for.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        // 1. Stop accepting new jobs
        self.accepting_new.store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new jobs");

        // 2. Cancel the main job with a bounded wait
        let shutdown_timeout = self.config.cancel_grace + SHUTDOWN_CLEANUP_MARGIN;
        match tokio::time::timeout(shutdown_timeout, self.cancel()).await {
            Ok(true) => tracing::info!("Active download cancelled and cleaned up"),
            Ok(false) => tracing::debug!("No active download at shutdown"),
            Err(_) => {
                tracing::warn!("Timeout waiting for download cleanup, proceeding with shutdown")
            }
        }

        // 3. Emit shutdown event
        self.emit(Event::Shutdown);

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }
}
