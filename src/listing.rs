//! Listing calls: argument construction and output parsing
//!
//! Listings are informational runs of the tool against one URL. Their output is
//! plain text, one entry per line, and every entry keeps the 1-based position it
//! had in the full listing so that a filtered view still maps back correctly.

use crate::command::ArgumentVector;
use crate::error::{Result, ValidationError};
use crate::options::{ChannelContent, ListLimit};
use crate::types::ListedItem;
use crate::urls;
use chrono::NaiveDate;

/// Print template used when upload dates are requested
pub const DATED_TITLE_TEMPLATE: &str = "%(title)s\t%(upload_date)s";

/// Placeholder the tool prints for a missing field
const MISSING_FIELD: &str = "NA";

/// `-F URL`
pub fn format_listing_args(url: &str) -> ArgumentVector {
    let mut args = ArgumentVector::new();
    args.push("-F");
    args.push(url.trim());
    args
}

/// `--get-title --flat-playlist URL`
pub fn playlist_titles_args(url: &str) -> ArgumentVector {
    let mut args = ArgumentVector::new();
    args.push("--get-title");
    args.push("--flat-playlist");
    args.push(url.trim());
    args
}

/// Titles of a channel tab, optionally with upload dates, bounded by `limit`
pub fn channel_titles_args(endpoint_url: &str, with_dates: bool, limit: ListLimit) -> ArgumentVector {
    let mut args = ArgumentVector::new();
    if with_dates {
        args.push_pair("--print", DATED_TITLE_TEMPLATE);
    } else {
        args.push("--get-title");
        args.push("--flat-playlist");
    }
    push_limit(&mut args, limit);
    args.push(endpoint_url);
    args
}

/// One direct URL per entry, used to resolve selected positions
pub fn url_listing_args(endpoint_url: &str, limit: ListLimit) -> ArgumentVector {
    let mut args = ArgumentVector::new();
    args.push("--get-url");
    args.push("--flat-playlist");
    args.push("--no-playlist");
    args.push("--no-cache-dir");
    push_limit(&mut args, limit);
    args.push(endpoint_url);
    args
}

fn push_limit(args: &mut ArgumentVector, limit: ListLimit) {
    if let Some(end) = limit.playlist_end() {
        args.push_pair("--playlist-end", end.to_string());
    }
}

/// Validate a URL for playlist listing
///
/// Channel URLs are rejected with their own error so the caller can point the
/// user at channel listing instead.
pub fn playlist_listing_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyUrls.into());
    }
    if urls::is_channel_url(url) {
        return Err(ValidationError::ChannelUrlInPlaylistListing {
            url: url.to_string(),
        }
        .into());
    }
    if !urls::is_playlist_url(url) {
        return Err(ValidationError::InvalidPlaylistUrl {
            url: url.to_string(),
        }
        .into());
    }
    Ok(url.to_string())
}

/// Channel root plus the tab endpoint, e.g. `https://www.youtube.com/@Name/shorts`
pub fn channel_listing_url(url: &str, content: ChannelContent) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyUrls.into());
    }
    let root = urls::channel_root(url).ok_or_else(|| ValidationError::InvalidChannelUrl {
        url: url.to_string(),
    })?;
    Ok(format!("{}{}", root, content.endpoint()))
}

/// Non-empty trimmed lines, in order
fn entries(output: &str) -> impl Iterator<Item = &str> {
    output.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// One title per line
pub fn parse_titles(output: &str) -> Vec<ListedItem> {
    entries(output)
        .zip(1u32..)
        .map(|(title, ordinal)| ListedItem {
            ordinal,
            title: title.to_string(),
            upload_date: None,
        })
        .collect()
}

/// `title<TAB>YYYYMMDD` per line, as printed by [`DATED_TITLE_TEMPLATE`]
pub fn parse_dated_entries(output: &str) -> Vec<ListedItem> {
    entries(output)
        .zip(1u32..)
        .map(|(line, ordinal)| {
            let (title, raw_date) = line.split_once('\t').unwrap_or((line, ""));
            ListedItem {
                ordinal,
                title: title.trim().to_string(),
                upload_date: format_upload_date(raw_date),
            }
        })
        .collect()
}

/// One URL per line
pub fn parse_urls(output: &str) -> Vec<String> {
    entries(output).map(str::to_string).collect()
}

/// `20240131` becomes `2024-01-31`; missing or malformed dates give `None`
pub fn format_upload_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == MISSING_FIELD {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Case-insensitive substring filter over titles
///
/// Items keep their original ordinals. A blank query returns everything.
pub fn filter_items<'a>(items: &'a [ListedItem], query: &str) -> Vec<&'a ListedItem> {
    let query = query.trim().to_lowercase();
    items
        .iter()
        .filter(|item| query.is_empty() || item.title.to_lowercase().contains(&query))
        .collect()
}
