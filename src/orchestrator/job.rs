//! Starting, streaming and finishing the main download job.

use super::{ActiveJob, Orchestrator, cleanup, validation};
use crate::command::{self, ArgumentVector};
use crate::error::{Error, Result, ValidationError};
use crate::listing;
use crate::options::Options;
use crate::process::{self, RunningProcess};
use crate::progress::ProgressTracker;
use crate::resolver::ResolveRequest;
use crate::types::{Event, ExitOutcome, JobId, JobKind, OrchestratorState, OutputStream};
use crate::urls;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio_util::sync::CancellationToken;

/// How the job gets its argument vector
#[derive(Debug)]
enum JobPlan {
    /// Arguments are known up front
    Direct(ArgumentVector),
    /// Selected channel positions must be resolved to URLs first
    ResolveChannel(ResolveRequest),
}

#[derive(Debug)]
struct JobContext {
    id: JobId,
    options: Options,
    plan: JobPlan,
    output_dir: PathBuf,
    started_at: SystemTime,
    cancel: CancellationToken,
    finished: CancellationToken,
}

/// Why the streaming loop stopped
enum StreamEnd {
    Exited(ExitOutcome),
    Cancelled,
}

impl Orchestrator {
    /// Start the main download job for an options snapshot
    ///
    /// Preconditions are checked before this returns; a failure here means nothing
    /// was spawned and the state stays `Idle`. On success the job continues in the
    /// background and reports through events.
    ///
    /// # Errors
    ///
    /// - [`Error::ShuttingDown`] after [`Orchestrator::shutdown`]
    /// - [`ValidationError::JobAlreadyRunning`] while another main job is active
    /// - any other [`ValidationError`] from the URL, output directory or selection checks
    pub async fn start_download(&self, options: Options) -> Result<JobId> {
        if !self.is_accepting() {
            return Err(Error::ShuttingDown);
        }

        let mut active = self.active.lock().await;
        if active.is_some() {
            return Err(ValidationError::JobAlreadyRunning.into());
        }

        let id = self.next_id();
        let prepared = match self.prepare(&options).await {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::warn!(job_id = id.0, error = %e, "Download rejected");
                self.emit(Event::JobFailed {
                    id,
                    category: e.category().to_string(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        };
        let (plan, output_dir) = prepared;

        let cancel = CancellationToken::new();
        let finished = CancellationToken::new();
        let ctx = JobContext {
            id,
            options,
            plan,
            output_dir,
            started_at: SystemTime::now(),
            cancel: cancel.clone(),
            finished: finished.clone(),
        };

        tracing::info!(job_id = id.0, dir = %ctx.output_dir.display(), "Starting download");

        let this = self.clone();
        tokio::spawn(async move {
            this.run_job(ctx).await;
        });
        *active = Some(ActiveJob {
            id,
            cancel,
            finished,
        });

        Ok(id)
    }

    async fn prepare(&self, options: &Options) -> Result<(JobPlan, PathBuf)> {
        let url_list = options.url_list();
        let Some(first_url) = url_list.first() else {
            return Err(ValidationError::EmptyUrls.into());
        };

        let output_dir = validation::prepare_output_dir(&options.output).await?;

        let plan = if options.channel.use_selected && urls::is_channel_url(first_url) {
            let ordinals: Vec<u32> = options
                .channel
                .selected
                .iter()
                .copied()
                .filter(|&n| n > 0)
                .collect();
            if ordinals.is_empty() {
                return Err(ValidationError::EmptySelection.into());
            }
            JobPlan::ResolveChannel(ResolveRequest {
                listing_url: listing::channel_listing_url(first_url, options.channel.content)?,
                limit: options.channel.list_limit,
                ordinals,
            })
        } else {
            JobPlan::Direct(command::build_for_job(options)?)
        };

        Ok((plan, output_dir))
    }

    async fn run_job(&self, ctx: JobContext) {
        let id = ctx.id;
        let _finished = ctx.finished.clone().drop_guard();
        if let Err(e) = self.execute(&ctx).await {
            tracing::error!(job_id = id.0, error = %e, "Download failed");
            self.emit(Event::JobFailed {
                id,
                category: e.category().to_string(),
                error: e.to_string(),
            });
        }

        self.set_state(OrchestratorState::Idle);

        let mut active = self.active.lock().await;
        if active.as_ref().is_some_and(|job| job.id == id) {
            *active = None;
        }
    }

    async fn execute(&self, ctx: &JobContext) -> Result<()> {
        let args = match &ctx.plan {
            JobPlan::Direct(args) => args.clone(),
            JobPlan::ResolveChannel(request) => match self.resolve(ctx, request).await? {
                Some(args) => args,
                None => return Ok(()),
            },
        };

        if ctx.cancel.is_cancelled() {
            self.cancelled_before_spawn(ctx.id);
            return Ok(());
        }

        let mut process = process::spawn(&self.program, &args)?;
        self.set_state(OrchestratorState::Running);
        self.emit(Event::JobStarted {
            id: ctx.id,
            kind: JobKind::Download,
            command: args.to_string(),
        });

        let mut tracker = ProgressTracker::new();
        match self.stream(ctx, &mut process, &mut tracker).await? {
            StreamEnd::Exited(exit) => {
                tracing::info!(job_id = ctx.id.0, code = ?exit.code, "Download finished");
                self.emit(Event::JobFinished {
                    id: ctx.id,
                    exit_code: exit.code,
                    crashed: exit.crashed(),
                });
            }
            StreamEnd::Cancelled => {
                self.stop_and_clean(ctx, process, tracker).await;
            }
        }
        Ok(())
    }

    /// Resolve channel positions; `None` when cancelled meanwhile
    async fn resolve(
        &self,
        ctx: &JobContext,
        request: &ResolveRequest,
    ) -> Result<Option<ArgumentVector>> {
        self.set_state(OrchestratorState::Resolving);
        self.emit(Event::ResolutionStarted {
            id: ctx.id,
            url: request.listing_url.clone(),
            selected: request.ordinals.len(),
        });

        let max_attempts = self.config.retry.max_attempts.max(1);
        let on_retry = |attempt: u32, e: &Error| {
            self.emit(Event::ResolutionRetry {
                id: ctx.id,
                attempt,
                max_attempts,
                error: e.to_string(),
            });
        };

        let resolution = tokio::select! {
            _ = ctx.cancel.cancelled() => None,
            result = self.resolver.resolve(request, on_retry) => Some(result?),
        };
        let Some(resolution) = resolution else {
            self.cancelled_before_spawn(ctx.id);
            return Ok(None);
        };

        for &ordinal in &resolution.skipped {
            self.emit(Event::ItemSkipped {
                id: ctx.id,
                ordinal,
                available: resolution.available,
            });
        }
        self.emit(Event::Resolved {
            id: ctx.id,
            urls: resolution.urls.clone(),
        });

        let mut options = ctx.options.clone();
        options.urls = resolution.urls.join(" ");
        Ok(Some(command::build(&options)))
    }

    async fn stream(
        &self,
        ctx: &JobContext,
        process: &mut RunningProcess,
        tracker: &mut ProgressTracker,
    ) -> Result<StreamEnd> {
        loop {
            let next = tokio::select! {
                _ = ctx.cancel.cancelled() => return Ok(StreamEnd::Cancelled),
                line = process.next_line() => line,
            };
            match next {
                Some((stream, line)) => self.handle_line(ctx.id, tracker, stream, line),
                None => break,
            }
        }

        let exit = tokio::select! {
            _ = ctx.cancel.cancelled() => None,
            exit = process.wait() => Some(exit?),
        };
        Ok(exit.map_or(StreamEnd::Cancelled, StreamEnd::Exited))
    }

    fn handle_line(
        &self,
        id: JobId,
        tracker: &mut ProgressTracker,
        stream: OutputStream,
        line: String,
    ) {
        if stream == OutputStream::Stdout {
            let update = tracker.feed(&line);
            if let Some(path) = update.artifact {
                tracing::debug!(job_id = id.0, path = %path.display(), "Tracking artifact");
                self.emit(Event::ArtifactTracked { id, path });
            }
            if let Some(phase) = update.phase {
                self.emit(Event::PhaseChanged { id, phase });
            }
            if let Some(percent) = update.percent {
                self.emit(Event::Progress {
                    id,
                    percent,
                    text: tracker.display_text(),
                });
            }
        }
        self.emit(Event::Output { id, stream, line });
    }

    /// Nothing was spawned, so there is nothing to stop or delete
    fn cancelled_before_spawn(&self, id: JobId) {
        self.set_state(OrchestratorState::Cancelling);
        tracing::info!(job_id = id.0, "Download cancelled before the tool was started");
        self.emit(Event::Cancelled {
            id,
            deleted: Vec::new(),
        });
    }

    /// Terminate, wait out the grace period, then delete the job's files
    async fn stop_and_clean(
        &self,
        ctx: &JobContext,
        mut process: RunningProcess,
        mut tracker: ProgressTracker,
    ) {
        self.set_state(OrchestratorState::Cancelling);
        tracing::info!(job_id = ctx.id.0, "Cancelling download");

        if let Err(e) = process.terminate() {
            tracing::warn!(job_id = ctx.id.0, error = %e, "Failed to signal process");
        }

        match tokio::time::timeout(self.config.cancel_grace, process.wait()).await {
            Ok(Ok(exit)) => {
                tracing::debug!(job_id = ctx.id.0, code = ?exit.code, "Process stopped");
            }
            Ok(Err(e)) => {
                tracing::warn!(job_id = ctx.id.0, error = %e, "Failed to wait for process");
            }
            Err(_) => {
                tracing::warn!(
                    job_id = ctx.id.0,
                    grace_ms = self.config.cancel_grace.as_millis() as u64,
                    "Process did not stop within grace period, killing"
                );
                if let Err(e) = process.kill() {
                    tracing::warn!(job_id = ctx.id.0, error = %e, "Failed to kill process");
                }
            }
        }

        // Lines already read but not yet classified may still announce files
        for (stream, line) in process.drain_ready() {
            if stream == OutputStream::Stdout {
                tracker.feed(&line);
            }
        }

        let deleted = cleanup::remove_job_files(
            tracker.artifacts(),
            &ctx.output_dir,
            &self.config.partial_extension,
            ctx.started_at,
        )
        .await;

        self.emit(Event::Cancelled {
            id: ctx.id,
            deleted,
        });
    }
}
