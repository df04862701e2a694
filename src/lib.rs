//! # ytdlp-frontend
//!
//! Command construction and process orchestration core for `yt-dlp` front-ends.
//!
//! ## Design Philosophy
//!
//! ytdlp-frontend is designed to be:
//! - **Deterministic** - The same option snapshot always builds the same argument vector
//! - **Library-first** - No UI, purely a Rust crate for embedding behind any front-end
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! The external tool is a black box: this crate builds its command lines, runs it,
//! reads its output into phases and percentages, and cleans up after cancellation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ytdlp_frontend::{Config, Options, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::new(Config::default());
//!
//!     // Subscribe to events
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let mut options = Options::default();
//!     options.urls = "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string();
//!     options.output.output_dir = "/tmp".to_string();
//!
//!     orchestrator.start_download(options).await?;
//!     orchestrator.wait_for_job().await;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Argument vector construction
pub mod command;
/// Configuration types
pub mod config;
/// Bookmark persistence layer
pub mod db;
/// Error types
pub mod error;
/// Listing arguments and output parsing
pub mod listing;
/// User-facing option snapshot
pub mod options;
/// Download and listing job orchestration
pub mod orchestrator;
/// External process spawning and output streaming
pub mod process;
/// Progress classification of tool output
pub mod progress;
/// Ordinal-to-URL resolution with retries
pub mod resolver;
/// Fixed-delay retry logic
pub mod retry;
/// Core types and events
pub mod types;
/// URL shape detection
pub mod urls;

// Re-export commonly used types
pub use command::{ArgumentVector, compress_ranges};
pub use config::{Config, RetryConfig, ToolsConfig};
pub use db::{Bookmark, Database, NewBookmark};
pub use error::{
    DatabaseError, Error, ProcessError, ResolutionError, Result, ValidationError,
};
pub use options::{ChannelContent, ListLimit, Options};
pub use orchestrator::{ChannelListing, ChannelListingRequest, Orchestrator};
pub use progress::{Phase, ProgressTracker};
pub use resolver::{CliListingSource, ListingSource, Resolution, ResolveRequest, Resolver};
pub use types::{Event, ExitOutcome, JobId, JobKind, ListedItem, OrchestratorState, OutputStream};

/// Run until the process is asked to stop, then shut the orchestrator down.
///
/// Stopping means SIGTERM or SIGINT on unix and Ctrl-C elsewhere. The shutdown
/// refuses new work and cancels the active download, deleting its partial files.
///
/// # Example
///
/// ```no_run
/// use ytdlp_frontend::{Config, Orchestrator, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let orchestrator = Orchestrator::new(Config::default());
///     run_with_shutdown(orchestrator).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(orchestrator: Orchestrator) -> Result<()> {
    termination_signal().await;
    orchestrator.shutdown().await
}

// Handlers are installed by the call itself, before the returned future is polled.
#[cfg(unix)]
fn termination_signal() -> impl std::future::Future<Output = ()> {
    use tokio::signal::unix::{SignalKind, signal};

    let terminate = signal(SignalKind::terminate());
    let interrupt = signal(SignalKind::interrupt());

    async move {
        match (terminate, interrupt) {
            (Ok(mut terminate), Ok(mut interrupt)) => {
                let name = tokio::select! {
                    _ = terminate.recv() => "SIGTERM",
                    _ = interrupt.recv() => "SIGINT",
                };
                tracing::info!(signal = name, "Stop requested");
            }
            (Ok(mut only), Err(e)) | (Err(e), Ok(mut only)) => {
                tracing::warn!(error = %e, "Only one termination signal can be observed");
                only.recv().await;
                tracing::info!("Stop requested");
            }
            (Err(e), Err(_)) => {
                tracing::error!(
                    error = %e,
                    "No termination signal can be observed, call shutdown() directly"
                );
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
fn termination_signal() -> impl std::future::Future<Output = ()> {
    async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!(signal = "ctrl-c", "Stop requested"),
            Err(e) => {
                tracing::error!(error = %e, "Ctrl-C cannot be observed, call shutdown() directly");
                std::future::pending::<()>().await;
            }
        }
    }
}
