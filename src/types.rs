//! Core types for ytdlp-frontend

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use crate::progress::Phase;

/// Unique identifier for one external process invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl JobId {
    /// Create a new JobId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// What an external process was started for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// The main download
    Download,
    /// `-F` format table
    ListFormats,
    /// Titles of a playlist
    ListPlaylist,
    /// Titles (and optionally dates) of a channel tab
    ListChannel,
    /// Item URLs used to resolve a channel selection
    ResolveUrls,
}

/// State of the main-job lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    /// No main job
    #[default]
    Idle,
    /// Turning selected channel positions into URLs
    Resolving,
    /// The download process is running
    Running,
    /// Termination signal sent, cleanup pending
    Cancelling,
}

/// Which standard stream a line came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStream {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

/// How a process ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitOutcome {
    /// Exit code, `None` when the process was killed by a signal or crashed
    pub code: Option<i32>,
}

impl ExitOutcome {
    /// Terminated without an exit code
    pub fn crashed(&self) -> bool {
        self.code.is_none()
    }

    /// Exited with code 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ExitOutcome {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// One entry of a playlist or channel listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedItem {
    /// 1-based position in the full listing (kept when the list is filtered)
    pub ordinal: u32,
    /// Title as printed by the tool
    pub title: String,
    /// Upload date as `YYYY-MM-DD`, when requested and known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
}

impl ListedItem {
    /// `Title (YYYY-MM-DD)`, or just the title
    pub fn display_text(&self) -> String {
        match &self.upload_date {
            Some(date) => format!("{} ({})", self.title, date),
            None => self.title.clone(),
        }
    }
}

/// Event emitted by the orchestrator
///
/// Consumers can subscribe to these events to drive a UI or log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Main-job state changed
    StateChanged {
        /// New state
        state: OrchestratorState,
    },

    /// Channel selection is being resolved to URLs
    ResolutionStarted {
        /// Job ID of the main job
        id: JobId,
        /// Listing endpoint being resolved
        url: String,
        /// Number of positions selected
        selected: usize,
    },

    /// A URL listing attempt failed and will be retried
    ResolutionRetry {
        /// Job ID of the main job
        id: JobId,
        /// Attempt about to start (2-based)
        attempt: u32,
        /// Total attempts allowed
        max_attempts: u32,
        /// Why the previous attempt failed
        error: String,
    },

    /// A selected position does not exist in the listing
    ItemSkipped {
        /// Job ID of the main job
        id: JobId,
        /// The missing position
        ordinal: u32,
        /// Number of items the listing returned
        available: usize,
    },

    /// Selection resolved; the download will use these URLs
    Resolved {
        /// Job ID of the main job
        id: JobId,
        /// Resolved item URLs in ordinal order
        urls: Vec<String>,
    },

    /// An external process was spawned
    JobStarted {
        /// Job ID
        id: JobId,
        /// What the process is for
        kind: JobKind,
        /// Human-readable command line
        command: String,
    },

    /// A line of process output
    Output {
        /// Job ID
        id: JobId,
        /// Which stream
        stream: OutputStream,
        /// The line, without its terminator
        line: String,
    },

    /// Download phase advanced
    PhaseChanged {
        /// Job ID
        id: JobId,
        /// New phase
        phase: Phase,
    },

    /// Download percentage changed
    Progress {
        /// Job ID
        id: JobId,
        /// Percentage (0-100), pinned at 100 while post-processing
        percent: u8,
        /// `42%` or `Post-processing...`
        text: String,
    },

    /// The tool announced a file it is creating
    ArtifactTracked {
        /// Job ID
        id: JobId,
        /// Announced path
        path: PathBuf,
    },

    /// Main download process exited on its own
    JobFinished {
        /// Job ID
        id: JobId,
        /// Exit code, if any
        exit_code: Option<i32>,
        /// Terminated without an exit code
        crashed: bool,
    },

    /// Main job could not start or complete
    JobFailed {
        /// Job ID
        id: JobId,
        /// Error category
        category: String,
        /// Error message
        error: String,
    },

    /// Main job was cancelled and cleaned up
    Cancelled {
        /// Job ID
        id: JobId,
        /// Files removed during cleanup
        deleted: Vec<PathBuf>,
    },

    /// A listing process was spawned
    ListingStarted {
        /// Job ID
        id: JobId,
        /// Kind of listing
        kind: JobKind,
        /// URL being listed
        url: String,
    },

    /// A listing process ended
    ListingFinished {
        /// Job ID
        id: JobId,
        /// Kind of listing
        kind: JobKind,
        /// Exit code, if any
        exit_code: Option<i32>,
        /// Terminated without an exit code
        crashed: bool,
        /// Number of items parsed (0 for format listings)
        items: usize,
    },

    /// Orchestrator is shutting down
    Shutdown,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_round_trips_through_text() {
        let id: JobId = "17".parse().unwrap();
        assert_eq!(id, JobId::new(17));
        assert_eq!(id.to_string(), "17");
        assert_eq!(serde_json::to_string(&id).unwrap(), "17");
    }

    #[test]
    fn events_are_tagged_snake_case() {
        let event = Event::JobFinished {
            id: JobId(3),
            exit_code: Some(1),
            crashed: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "job_finished");
        assert_eq!(json["exit_code"], 1);

        let json = serde_json::to_value(Event::StateChanged {
            state: OrchestratorState::Cancelling,
        })
        .unwrap();
        assert_eq!(json["state"], "cancelling");
    }

    #[test]
    fn listed_item_display() {
        let item = ListedItem {
            ordinal: 1,
            title: "Intro".into(),
            upload_date: Some("2024-01-31".into()),
        };
        assert_eq!(item.display_text(), "Intro (2024-01-31)");
    }

    #[cfg(unix)]
    #[test]
    fn signal_exit_counts_as_crash() {
        use std::os::unix::process::ExitStatusExt;
        let outcome = ExitOutcome::from(std::process::ExitStatus::from_raw(9));
        assert!(outcome.crashed());
        assert!(!outcome.success());

        let outcome = ExitOutcome::from(std::process::ExitStatus::from_raw(0));
        assert!(outcome.success());
    }
}
