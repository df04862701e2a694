//! Resolution of selected listing positions into item URLs
//!
//! A channel listing shown to the user carries titles only. To download a subset,
//! the listing is fetched again with one direct URL per entry and the selected
//! 1-based positions are picked out of it. The listing call is retried a fixed
//! number of times; positions beyond the end of the listing are skipped, and an
//! empty result is a hard failure.

use crate::command::ArgumentVector;
use crate::config::RetryConfig;
use crate::error::{Error, ResolutionError, Result, ValidationError};
use crate::listing;
use crate::options::ListLimit;
use crate::process;
use crate::retry::{IsRetryable, retry_fixed};
use crate::types::OutputStream;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Something that can run a listing call and return its stdout
///
/// Implementations must return an error for a non-zero exit or a crash, so the
/// resolver can decide whether to retry.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Run the tool with `args` and return everything it printed on stdout
    async fn run_listing(&self, args: &ArgumentVector) -> Result<String>;
}

/// [`ListingSource`] backed by the real external tool
#[derive(Clone, Debug)]
pub struct CliListingSource {
    program: PathBuf,
}

impl CliListingSource {
    /// Use `program` for every listing call
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

#[async_trait]
impl ListingSource for CliListingSource {
    async fn run_listing(&self, args: &ArgumentVector) -> Result<String> {
        let captured = process::run_to_completion(&self.program, args, |stream, line| {
            if stream == OutputStream::Stderr {
                tracing::debug!(line, "Listing stderr");
            }
        })
        .await?
        .into_result()?;
        Ok(captured.stdout_text())
    }
}

/// What to resolve
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Listing endpoint, e.g. a channel's `/videos` tab
    pub listing_url: String,
    /// Same bound the displayed listing used, so positions line up
    pub limit: ListLimit,
    /// Selected 1-based positions
    pub ordinals: Vec<u32>,
}

/// Outcome of a successful resolution
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Item URLs in ascending position order
    pub urls: Vec<String>,
    /// Requested positions past the end of the listing
    pub skipped: Vec<u32>,
    /// Number of entries the listing returned
    pub available: usize,
    /// Listing calls made, including the successful one
    pub attempts: u32,
}

/// Retrying resolver over a [`ListingSource`]
#[derive(Clone)]
pub struct Resolver {
    source: Arc<dyn ListingSource>,
    retry: RetryConfig,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Create a resolver with the given source and retry policy
    pub fn new(source: Arc<dyn ListingSource>, retry: RetryConfig) -> Self {
        Self { source, retry }
    }

    /// Resolve `request` into item URLs
    ///
    /// `on_retry(next_attempt, &error)` is called before each retry pause.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptySelection`] when no positive position was given
    /// - [`ResolutionError::Exhausted`] when every listing attempt failed
    /// - [`ResolutionError::NoValidItems`] when no selected position exists
    /// - the underlying error when the tool could not be started at all
    pub async fn resolve<R>(&self, request: &ResolveRequest, on_retry: R) -> Result<Resolution>
    where
        R: FnMut(u32, &Error),
    {
        let mut ordinals: Vec<u32> = request.ordinals.iter().copied().filter(|&n| n > 0).collect();
        ordinals.sort_unstable();
        ordinals.dedup();
        if ordinals.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }

        let args = listing::url_listing_args(&request.listing_url, request.limit);
        let mut attempts = 0u32;

        let outcome = retry_fixed(&self.retry, on_retry, || {
            attempts += 1;
            let source = Arc::clone(&self.source);
            let args = args.clone();
            async move { source.run_listing(&args).await }
        })
        .await;

        let output = match outcome {
            Ok(output) => output,
            Err(e) if e.is_retryable() => {
                return Err(ResolutionError::Exhausted {
                    attempts,
                    last_error: e.to_string(),
                }
                .into());
            }
            Err(e) => return Err(e),
        };

        let all = listing::parse_urls(&output);
        let mut resolution = Resolution {
            available: all.len(),
            attempts,
            ..Default::default()
        };

        for ordinal in ordinals {
            match all.get(ordinal as usize - 1) {
                Some(url) => {
                    tracing::debug!(ordinal, url = %url, "Resolved selected item");
                    resolution.urls.push(url.clone());
                }
                None => {
                    tracing::warn!(
                        ordinal,
                        available = all.len(),
                        "Selected position out of range, skipping"
                    );
                    resolution.skipped.push(ordinal);
                }
            }
        }

        if resolution.urls.is_empty() {
            return Err(ResolutionError::NoValidItems {
                requested: resolution.skipped.len(),
                available: all.len(),
            }
            .into());
        }

        tracing::info!(
            resolved = resolution.urls.len(),
            skipped = resolution.skipped.len(),
            attempts,
            "Selection resolved"
        );
        Ok(resolution)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessError;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Fails `failures` times with a non-zero exit, then prints `output`
    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
        output: String,
        seen_args: Mutex<Vec<Vec<String>>>,
    }

    impl FlakySource {
        fn new(failures: u32, output: &str) -> Arc<Self> {
            Arc::new(Self {
                failures,
                calls: AtomicU32::new(0),
                output: output.to_string(),
                seen_args: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ListingSource for FlakySource {
        async fn run_listing(&self, args: &ArgumentVector) -> Result<String> {
            self.seen_args.lock().unwrap().push(args.as_slice().to_vec());
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(ProcessError::NonZeroExit { code: 1 }.into())
            } else {
                Ok(self.output.clone())
            }
        }
    }

    struct UnstartableSource;

    #[async_trait]
    impl ListingSource for UnstartableSource {
        async fn run_listing(&self, _args: &ArgumentVector) -> Result<String> {
            Err(ProcessError::SpawnFailed {
                program: "yt-dlp".into(),
                reason: "No such file or directory".into(),
            }
            .into())
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            delay: Duration::from_millis(5),
        }
    }

    fn request(ordinals: Vec<u32>) -> ResolveRequest {
        ResolveRequest {
            listing_url: "https://www.youtube.com/@Name/videos".into(),
            limit: ListLimit::Limit(10),
            ordinals,
        }
    }

    const FIVE_URLS: &str = "https://youtu.be/1\nhttps://youtu.be/2\nhttps://youtu.be/3\nhttps://youtu.be/4\nhttps://youtu.be/5\n";

    #[tokio::test]
    async fn succeeds_on_third_attempt_without_a_fourth() {
        let source = FlakySource::new(2, FIVE_URLS);
        let resolver = Resolver::new(source.clone(), fast_retry());
        let mut retries = Vec::new();

        let resolution = resolver
            .resolve(&request(vec![2]), |next, _| retries.push(next))
            .await
            .unwrap();

        assert_eq!(resolution.urls, vec!["https://youtu.be/2"]);
        assert_eq!(resolution.attempts, 3);
        assert_eq!(source.calls(), 3);
        assert_eq!(retries, vec![2, 3]);
    }

    #[tokio::test]
    async fn exhausted_after_three_failures() {
        let source = FlakySource::new(u32::MAX, "");
        let resolver = Resolver::new(source.clone(), fast_retry());

        let err = resolver.resolve(&request(vec![1]), |_, _| {}).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Resolution(ResolutionError::Exhausted { attempts: 3, .. })
        ));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn out_of_range_positions_are_skipped_and_order_is_ascending() {
        let source = FlakySource::new(0, FIVE_URLS);
        let resolver = Resolver::new(source, fast_retry());

        let resolution = resolver
            .resolve(&request(vec![9, 4, 1, 4, 0]), |_, _| {})
            .await
            .unwrap();

        assert_eq!(resolution.urls, vec!["https://youtu.be/1", "https://youtu.be/4"]);
        assert_eq!(resolution.skipped, vec![9]);
        assert_eq!(resolution.available, 5);
        assert_eq!(resolution.attempts, 1);
    }

    #[tokio::test]
    async fn all_positions_out_of_range_is_a_failure() {
        let source = FlakySource::new(0, FIVE_URLS);
        let resolver = Resolver::new(source, fast_retry());

        let err = resolver.resolve(&request(vec![6, 7]), |_, _| {}).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Resolution(ResolutionError::NoValidItems {
                requested: 2,
                available: 5
            })
        ));
    }

    #[tokio::test]
    async fn empty_selection_never_calls_the_tool() {
        let source = FlakySource::new(0, FIVE_URLS);
        let resolver = Resolver::new(source.clone(), fast_retry());

        let err = resolver.resolve(&request(vec![0]), |_, _| {}).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::EmptySelection)
        ));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn spawn_failure_is_not_retried() {
        let resolver = Resolver::new(Arc::new(UnstartableSource), fast_retry());
        let err = resolver.resolve(&request(vec![1]), |_, _| {}).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Process(ProcessError::SpawnFailed { .. })
        ));
    }

    #[tokio::test]
    async fn listing_call_uses_limit_and_endpoint() {
        let source = FlakySource::new(0, FIVE_URLS);
        let resolver = Resolver::new(source.clone(), fast_retry());
        resolver.resolve(&request(vec![1]), |_, _| {}).await.unwrap();

        let seen = source.seen_args.lock().unwrap();
        assert_eq!(
            seen[0],
            vec![
                "--get-url",
                "--flat-playlist",
                "--no-playlist",
                "--no-cache-dir",
                "--playlist-end",
                "10",
                "https://www.youtube.com/@Name/videos",
            ]
        );
    }
}
