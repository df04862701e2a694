//! URL shape detection for playlist and channel addresses

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

static PLAYLIST_URL: LazyLock<Regex> = LazyLock::new(|| {
    static_pattern(
        r"^https?://(?:(?:www|m)\.)?youtube\.(?:com|co\.[a-zA-Z]{2})/(?:playlist\?list=[a-zA-Z0-9_.-]+|watch\?v=[a-zA-Z0-9_.-]+&list=[a-zA-Z0-9_.-]+.*)$",
    )
});

// Capture 1 is the channel root, including a trailing slash when one was present.
static CHANNEL_URL: LazyLock<Regex> = LazyLock::new(|| {
    static_pattern(
        r"^(https?://(?:(?:www|m)\.)?youtube\.(?:com|co\.[a-zA-Z]{2})/(?:c/[^/?#\s]+|channel/[^/?#\s]+|user/[^/?#\s]+|@[a-zA-Z0-9_.-]+)(?:/|$))",
    )
});

#[allow(clippy::expect_used)]
fn static_pattern(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("built-in URL pattern must compile")
}

/// Split the URL field into individual URLs
pub fn split_urls(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Whether the URL points at a playlist (or a video inside one)
pub fn is_playlist_url(url: &str) -> bool {
    PLAYLIST_URL.is_match(url.trim())
}

/// Whether the URL points at a channel (`@handle`, `channel/ID`, `c/NAME`, `user/NAME`)
pub fn is_channel_url(url: &str) -> bool {
    CHANNEL_URL.is_match(url.trim())
}

/// Reduce a channel URL to its root, dropping tabs like `/videos` and any trailing slash
///
/// `https://www.youtube.com/@Name/featured` becomes `https://www.youtube.com/@Name`.
pub fn channel_root(url: &str) -> Option<String> {
    let caps = CHANNEL_URL.captures(url.trim())?;
    let root = caps.get(1)?.as_str();
    Some(root.strip_suffix('/').unwrap_or(root).to_string())
}

/// Default bookmark name for a channel root: its last path segment without the `@`
pub fn channel_display_name(channel_root: &str) -> String {
    let last = url::Url::parse(channel_root.trim())
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()?
                .filter(|segment| !segment.is_empty())
                .last()
                .map(str::to_string)
        })
        .unwrap_or_default();
    last.strip_prefix('@').unwrap_or(&last).to_string()
}
