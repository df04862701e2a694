//! Progress classification of the tool's output
//!
//! [`ProgressTracker`] is fed stdout one line at a time, in arrival order. It moves
//! through [`Phase`]s, extracts download percentages, and records the paths the tool
//! announces as created so they can be removed if the job is cancelled.
//!
//! Recognised markers (case-sensitive):
//! - `[download] Destination: PATH` - enters [`Phase::Downloading`], tracks `PATH`
//! - `[Merger] Merging formats into "PATH"` - enters [`Phase::PostProcessing`], tracks `PATH`
//! - `[sponsorblock]`, `[ffmpeg]`, `[Metadata]` - enter [`Phase::PostProcessing`]
//! - `[download]  42.5%` or, failing that, aria2c's `(42%)` - percentage while downloading

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;

const DESTINATION_MARKER: &str = "[download] Destination:";
const MERGER_MARKER: &str = "[Merger] Merging formats into";
const POST_PROCESSING_TAGS: [&str; 3] = ["[sponsorblock]", "[ffmpeg]", "[Metadata]"];

/// Text shown instead of a percentage while post-processing
pub const POST_PROCESSING_LABEL: &str = "Post-processing...";

static TOOL_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| static_pattern(r"\[download\]\s*(\d+\.\d+)%"));
static ARIA2C_PERCENT: LazyLock<Regex> = LazyLock::new(|| static_pattern(r"\((\d+)%\)"));

#[allow(clippy::expect_used)]
fn static_pattern(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in progress pattern must compile")
}

/// Stage of a single job, as far as its output tells
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing recognised yet
    #[default]
    Idle,
    /// Media is being fetched
    Downloading,
    /// Merging, embedding, cutting (terminal for the job)
    PostProcessing,
}

/// What one line changed
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineUpdate {
    /// New phase, if the line caused a transition
    pub phase: Option<Phase>,
    /// New percentage (0-100), if the line reported one or post-processing pinned it
    pub percent: Option<u8>,
    /// Path the line announced as created
    pub artifact: Option<PathBuf>,
}

impl LineUpdate {
    /// True when the line changed nothing
    pub fn is_empty(&self) -> bool {
        self.phase.is_none() && self.percent.is_none() && self.artifact.is_none()
    }
}

/// Line-by-line progress state for one job
#[derive(Debug, Default)]
pub struct ProgressTracker {
    phase: Phase,
    percent: u8,
    artifacts: Vec<PathBuf>,
}

impl ProgressTracker {
    /// Fresh tracker in [`Phase::Idle`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one line of stdout
    ///
    /// Phases only move forward: a destination line seen after post-processing has
    /// started still records its path but does not return to downloading.
    pub fn feed(&mut self, line: &str) -> LineUpdate {
        let mut update = LineUpdate::default();

        if let Some(rest) = after_marker(line, DESTINATION_MARKER) {
            update.artifact = self.track(rest.trim());
            update.phase = self.advance(Phase::Downloading);
        } else if let Some(rest) = after_marker(line, MERGER_MARKER) {
            update.artifact = self.track(&rest.trim().replace('"', ""));
            update.phase = self.advance(Phase::PostProcessing);
        } else if POST_PROCESSING_TAGS.iter().any(|tag| line.contains(tag)) {
            update.phase = self.advance(Phase::PostProcessing);
        }

        match self.phase {
            Phase::Downloading => {
                if let Some(percent) = extract_percent(line) {
                    self.percent = percent;
                    update.percent = Some(percent);
                }
            }
            Phase::PostProcessing => {
                if update.phase.is_some() {
                    self.percent = 100;
                    update.percent = Some(100);
                }
            }
            Phase::Idle => {}
        }

        update
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Last known percentage (100 once post-processing)
    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Progress text for display: `42%`, or the post-processing label
    pub fn display_text(&self) -> String {
        match self.phase {
            Phase::PostProcessing => POST_PROCESSING_LABEL.to_string(),
            _ => format!("{}%", self.percent),
        }
    }

    /// Paths announced as created so far, in announcement order
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// Take the tracked paths, leaving the tracker's list empty
    pub fn take_artifacts(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.artifacts)
    }

    /// Back to [`Phase::Idle`] for the next job
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn advance(&mut self, next: Phase) -> Option<Phase> {
        if next > self.phase {
            self.phase = next;
            Some(next)
        } else {
            None
        }
    }

    fn track(&mut self, path: &str) -> Option<PathBuf> {
        if path.is_empty() {
            return None;
        }
        let path = PathBuf::from(path);
        if !self.artifacts.contains(&path) {
            self.artifacts.push(path.clone());
        }
        Some(path)
    }
}

fn after_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.find(marker).map(|idx| &line[idx + marker.len()..])
}

/// Percentage on a download line, truncated to a whole number
pub fn extract_percent(line: &str) -> Option<u8> {
    let caps = TOOL_PERCENT
        .captures(line)
        .or_else(|| ARIA2C_PERCENT.captures(line))?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(value.clamp(0.0, 100.0) as u8)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_progress_merge_sequence() {
        let mut tracker = ProgressTracker::new();

        let u = tracker.feed("[download] Destination: /tmp/video.mp4");
        assert_eq!(u.phase, Some(Phase::Downloading));
        assert_eq!(u.artifact, Some(PathBuf::from("/tmp/video.mp4")));

        let u = tracker.feed("[download]  42.5% of 10MiB");
        assert_eq!(u.phase, None);
        assert_eq!(u.percent, Some(42));
        assert_eq!(tracker.phase(), Phase::Downloading);
        assert_eq!(tracker.display_text(), "42%");

        let u = tracker.feed("[Merger] Merging formats into \"/tmp/video.mkv\"");
        assert_eq!(u.phase, Some(Phase::PostProcessing));
        assert_eq!(u.percent, Some(100));
        assert_eq!(tracker.display_text(), POST_PROCESSING_LABEL);

        assert_eq!(
            tracker.artifacts(),
            [PathBuf::from("/tmp/video.mp4"), PathBuf::from("/tmp/video.mkv")]
        );
    }

    #[test]
    fn no_regression_after_post_processing() {
        let mut tracker = ProgressTracker::new();
        tracker.feed("[download] Destination: /tmp/a.f137.mp4");
        tracker.feed("[ffmpeg] Merging something");
        assert_eq!(tracker.phase(), Phase::PostProcessing);

        let u = tracker.feed("[download] Destination: /tmp/b.mp4");
        assert_eq!(u.phase, None);
        assert_eq!(u.artifact, Some(PathBuf::from("/tmp/b.mp4")));
        assert_eq!(tracker.phase(), Phase::PostProcessing);

        let u = tracker.feed("[download]  10.0% of 5MiB");
        assert_eq!(u.percent, None);
        assert_eq!(tracker.percent(), 100);
    }

    #[test]
    fn percentages_ignored_while_idle() {
        let mut tracker = ProgressTracker::new();
        let u = tracker.feed("[download]  55.0% of 1MiB");
        assert!(u.is_empty());
        assert_eq!(tracker.percent(), 0);
    }

    #[test]
    fn aria2c_fallback_pattern() {
        assert_eq!(extract_percent("[download]  12.3% of 1GiB"), Some(12));
        assert_eq!(
            extract_percent("[#2089b0 400MiB/1.0GiB(39%) CN:16 DL:115MiB]"),
            Some(39)
        );
        assert_eq!(extract_percent("[download] 100% of 1GiB"), None);
        assert_eq!(extract_percent("nothing here"), None);
    }

    #[test]
    fn primary_pattern_wins_over_fallback() {
        assert_eq!(extract_percent("[download]  50.0% (12%)"), Some(50));
    }

    #[test]
    fn post_processing_tags() {
        for line in [
            "[sponsorblock] Found 2 segments",
            "[ffmpeg] Adding metadata",
            "[Metadata] Adding metadata to \"x.mkv\"",
        ] {
            let mut tracker = ProgressTracker::new();
            tracker.feed("[download] Destination: x.webm");
            let u = tracker.feed(line);
            assert_eq!(u.phase, Some(Phase::PostProcessing), "{line}");
            assert_eq!(u.percent, Some(100));
        }
    }

    #[test]
    fn duplicate_paths_tracked_once_and_reset_clears() {
        let mut tracker = ProgressTracker::new();
        tracker.feed("[download] Destination: /tmp/a.mp4");
        tracker.feed("[download] Destination: /tmp/a.mp4");
        assert_eq!(tracker.artifacts().len(), 1);

        tracker.reset();
        assert_eq!(tracker.phase(), Phase::Idle);
        assert!(tracker.artifacts().is_empty());
    }

    #[test]
    fn markers_are_case_sensitive() {
        let mut tracker = ProgressTracker::new();
        assert!(tracker.feed("[DOWNLOAD] destination: /tmp/a.mp4").is_empty());
        assert!(tracker.feed("[merger] merging formats into x").is_empty());
    }
}
