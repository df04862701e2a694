//! Process orchestration for download and listing jobs.
//!
//! The [`Orchestrator`] owns at most one main download job at a time and any
//! number of concurrent listing jobs. Its methods are organized by concern:
//! - [`validation`] - preconditions checked before anything is spawned
//! - [`job`] - starting, streaming and finishing the main download job
//! - [`cleanup`] - removing a cancelled job's files
//! - [`listing`] - format, playlist and channel listings
//! - [`lifecycle`] - cancellation and shutdown
//! - [`storage`] - option files and the bookmark store
//!
//! Main-job state moves `Idle → Resolving → Running → Cancelling → Idle`, with
//! `Resolving` only for channel-selection jobs. Every transition is broadcast as
//! [`Event::StateChanged`] and mirrored on a watch channel.

mod cleanup;
mod job;
mod lifecycle;
mod listing;
mod storage;
mod validation;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use listing::{ChannelListing, ChannelListingRequest};

use crate::config::Config;
use crate::resolver::{CliListingSource, ListingSource, Resolver};
use crate::types::{Event, JobId, OrchestratorState};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex, broadcast, watch};
use tokio_util::sync::CancellationToken;

/// The main download job currently owned by the orchestrator
#[derive(Debug)]
pub(crate) struct ActiveJob {
    pub(crate) id: JobId,
    pub(crate) cancel: CancellationToken,
    /// Cancelled once the job task has fully finished, cleanup included
    pub(crate) finished: CancellationToken,
}

/// Main orchestrator instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct Orchestrator {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Resolved path of the external tool
    pub(crate) program: Arc<PathBuf>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Current main-job state
    pub(crate) state_tx: Arc<watch::Sender<OrchestratorState>>,
    /// The main job, if one is active
    pub(crate) active: Arc<Mutex<Option<ActiveJob>>>,
    /// Flag to indicate whether new jobs are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
    /// Job ID counter shared by main and listing jobs
    pub(crate) next_job_id: Arc<AtomicU64>,
    /// Resolver for channel-selection jobs
    pub(crate) resolver: Resolver,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("program", &self.program)
            .field("state", &*self.state_tx.borrow())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an orchestrator that runs the configured `yt-dlp`
    pub fn new(config: Config) -> Self {
        let program = config.tools.ytdlp_program();
        let source = Arc::new(CliListingSource::new(program.clone()));
        Self::with_listing_source(config, source)
    }

    /// Create an orchestrator whose selection resolution goes through `source`
    pub fn with_listing_source(config: Config, source: Arc<dyn ListingSource>) -> Self {
        let program = config.tools.ytdlp_program();
        let (event_tx, _rx) = broadcast::channel(config.event_buffer.max(1));
        let (state_tx, _state_rx) = watch::channel(OrchestratorState::Idle);
        let resolver = Resolver::new(source, config.retry.clone());

        tracing::debug!(program = %program.display(), "Orchestrator created");

        Self {
            config: Arc::new(config),
            program: Arc::new(program),
            event_tx,
            state_tx: Arc::new(state_tx),
            active: Arc::new(Mutex::new(None)),
            accepting_new: Arc::new(AtomicBool::new(true)),
            next_job_id: Arc::new(AtomicU64::new(1)),
            resolver,
        }
    }

    /// Subscribe to orchestrator events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Current main-job state
    pub fn state(&self) -> OrchestratorState {
        *self.state_tx.borrow()
    }

    /// Watch main-job state changes
    pub fn watch_state(&self) -> watch::Receiver<OrchestratorState> {
        self.state_tx.subscribe()
    }

    /// The configuration this orchestrator was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Program spawned for every job
    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    /// ID of the active main job, if any
    pub async fn active_job(&self) -> Option<JobId> {
        self.active.lock().await.as_ref().map(|job| job.id)
    }

    pub(crate) fn next_id(&self) -> JobId {
        JobId(self.next_job_id.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn emit(&self, event: Event) {
        // No subscribers is not an error
        let _ = self.event_tx.send(event);
    }

    pub(crate) fn set_state(&self, state: OrchestratorState) {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            tracing::debug!(?state, "Orchestrator state changed");
            self.emit(Event::StateChanged { state });
        }
    }

    pub(crate) fn is_accepting(&self) -> bool {
        self.accepting_new.load(Ordering::SeqCst)
    }
}
