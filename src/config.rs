//! Configuration types for ytdlp-frontend
//!
//! [`Config`] holds the runtime settings of the core itself (which binary to run,
//! how to retry, how long to wait on cancel). The user-facing download options
//! live in [`crate::options::Options`].

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Name of the external tool looked up on `PATH`
pub const YTDLP_PROGRAM: &str = "yt-dlp";

/// External tool configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Where option files are written (default: `<user config dir>/yt-dlp/config`,
    /// the file yt-dlp reads on its own; `None` when the platform has no config dir)
    #[serde(default = "default_config_file_path")]
    pub config_file_path: Option<PathBuf>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            config_file_path: default_config_file_path(),
        }
    }
}

fn default_config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(YTDLP_PROGRAM).join("config"))
}

impl ToolsConfig {
    /// Program to spawn for every job
    ///
    /// An explicit path wins; otherwise PATH is searched when allowed, and the bare
    /// program name is used as a last resort so the OS reports the failure at spawn time.
    pub fn ytdlp_program(&self) -> PathBuf {
        if let Some(path) = &self.ytdlp_path {
            return path.clone();
        }
        if self.search_path
            && let Ok(found) = which::which(YTDLP_PROGRAM)
        {
            return found;
        }
        PathBuf::from(YTDLP_PROGRAM)
    }
}

/// Retry behavior for URL resolution
///
/// Fixed number of attempts with a fixed pause between them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts (default: 1000 ms)
    #[serde(default = "default_retry_delay", with = "duration_ms_serde")]
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay: default_retry_delay(),
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Bookmark database path (default: "./ytdlpf-bookmarks.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Main configuration for the orchestration core
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Retry policy for URL resolution
    #[serde(default)]
    pub retry: RetryConfig,

    /// Bounded wait after the termination signal before cleanup starts (default: 1000 ms)
    #[serde(default = "default_cancel_grace", with = "duration_ms_serde")]
    pub cancel_grace: Duration,

    /// Extension of partially-downloaded files swept on cancel (default: "part")
    #[serde(default = "default_partial_extension")]
    pub partial_extension: String,

    /// Capacity of the event broadcast channel (default: 1000)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Bookmark storage
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tools: ToolsConfig::default(),
            retry: RetryConfig::default(),
            cancel_grace: default_cancel_grace(),
            partial_extension: default_partial_extension(),
            event_buffer: default_event_buffer(),
            persistence: PersistenceConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_millis(1000)
}

fn default_cancel_grace() -> Duration {
    Duration::from_millis(1000)
}

fn default_partial_extension() -> String {
    "part".to_string()
}

fn default_event_buffer() -> usize {
    1000
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./ytdlpf-bookmarks.db")
}

// Millisecond Duration serialization helper
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
