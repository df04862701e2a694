//! Format, playlist and channel listings.
//!
//! Listings are independent of the main job and of each other: any number may run
//! at once, and each is owned by the caller awaiting it.

use super::Orchestrator;
use crate::command::ArgumentVector;
use crate::error::{Error, Result, ValidationError};
use crate::listing;
use crate::options::{ChannelContent, ListLimit, Options};
use crate::process::{self, Captured};
use crate::types::{Event, JobId, JobKind, ListedItem};
use crate::urls;
use serde::{Deserialize, Serialize};

/// Parameters of a channel listing
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelListingRequest {
    /// Any URL inside the channel; tabs like `/featured` are ignored
    pub url: String,
    /// Which tab to list
    pub content: ChannelContent,
    /// Upper bound on entries
    pub limit: ListLimit,
    /// Print upload dates next to titles (slower)
    pub with_dates: bool,
}

impl ChannelListingRequest {
    /// Request matching the first URL and channel settings of an options snapshot
    pub fn from_options(options: &Options) -> Self {
        Self {
            url: options.url_list().into_iter().next().unwrap_or_default(),
            content: options.channel.content,
            limit: options.channel.list_limit,
            with_dates: options.channel.show_upload_dates,
        }
    }
}

/// Result of a channel listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelListing {
    /// Normalised channel root, without trailing slash
    pub channel_root: String,
    /// Display name derived from the root (handle without `@`)
    pub channel_name: String,
    /// The tab URL that was listed
    pub listing_url: String,
    /// Entries with their 1-based positions
    pub items: Vec<ListedItem>,
}

impl Orchestrator {
    /// Print the available formats of `url` (`-F`)
    ///
    /// Returns the tool's table verbatim.
    pub async fn list_formats(&self, url: &str) -> Result<String> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrls.into());
        }
        let (id, captured) = self
            .run_listing(JobKind::ListFormats, url, &listing::format_listing_args(url))
            .await?;
        self.finish_listing(id, JobKind::ListFormats, Some(0), 0);
        Ok(captured.stdout_text())
    }

    /// Titles of a playlist, numbered from 1
    pub async fn list_playlist(&self, url: &str) -> Result<Vec<ListedItem>> {
        let url = listing::playlist_listing_url(url)?;
        let (id, captured) = self
            .run_listing(JobKind::ListPlaylist, &url, &listing::playlist_titles_args(&url))
            .await?;
        let items = listing::parse_titles(&captured.stdout_text());
        self.finish_listing(id, JobKind::ListPlaylist, Some(0), items.len());
        Ok(items)
    }

    /// Titles (and optionally upload dates) of one channel tab, numbered from 1
    pub async fn list_channel(&self, request: &ChannelListingRequest) -> Result<ChannelListing> {
        let listing_url = listing::channel_listing_url(&request.url, request.content)?;
        let channel_root = urls::channel_root(&request.url).unwrap_or_default();
        let args = listing::channel_titles_args(&listing_url, request.with_dates, request.limit);

        let (id, captured) = self
            .run_listing(JobKind::ListChannel, &listing_url, &args)
            .await?;
        let stdout = captured.stdout_text();
        let items = if request.with_dates {
            listing::parse_dated_entries(&stdout)
        } else {
            listing::parse_titles(&stdout)
        };
        self.finish_listing(id, JobKind::ListChannel, Some(0), items.len());

        Ok(ChannelListing {
            channel_name: urls::channel_display_name(&channel_root),
            channel_root,
            listing_url,
            items,
        })
    }

    /// Spawn one listing and forward its output as events
    ///
    /// On failure the listing is reported finished here; on success the caller
    /// reports it once the output is parsed.
    async fn run_listing(
        &self,
        kind: JobKind,
        url: &str,
        args: &ArgumentVector,
    ) -> Result<(JobId, Captured)> {
        if !self.is_accepting() {
            return Err(Error::ShuttingDown);
        }

        let id = self.next_id();
        tracing::info!(job_id = id.0, ?kind, url, "Starting listing");
        self.emit(Event::ListingStarted {
            id,
            kind,
            url: url.to_string(),
        });
        self.emit(Event::JobStarted {
            id,
            kind,
            command: args.to_string(),
        });

        let result = process::run_to_completion(&self.program, args, |stream, line| {
            self.emit(Event::Output {
                id,
                stream,
                line: line.to_string(),
            });
        })
        .await;

        let captured = match result {
            Ok(captured) => captured,
            Err(e) => {
                tracing::warn!(job_id = id.0, error = %e, "Listing could not run");
                self.emit(Event::ListingFinished {
                    id,
                    kind,
                    exit_code: None,
                    crashed: false,
                    items: 0,
                });
                return Err(e);
            }
        };

        let exit_code = captured.exit.and_then(|exit| exit.code);
        if exit_code != Some(0) {
            self.finish_listing(id, kind, exit_code, 0);
        }
        Ok((id, captured.into_result()?))
    }

    fn finish_listing(&self, id: JobId, kind: JobKind, exit_code: Option<i32>, items: usize) {
        match exit_code {
            Some(0) => tracing::info!(job_id = id.0, ?kind, items, "Listing finished"),
            Some(code) => tracing::warn!(job_id = id.0, ?kind, code, "Listing failed"),
            None => tracing::warn!(job_id = id.0, ?kind, "Listing process crashed"),
        }
        self.emit(Event::ListingFinished {
            id,
            kind,
            exit_code,
            crashed: exit_code.is_none(),
            items,
        });
    }
}
