//! Fixed-count retry with a fixed pause
//!
//! Listing calls to the external tool fail transiently (rate limits, flaky network).
//! [`retry_fixed`] re-runs an operation up to [`RetryConfig::max_attempts`] times in
//! total, sleeping [`RetryConfig::delay`] between attempts without blocking the runtime.
//!
//! # Example
//!
//! ```no_run
//! use ytdlp_frontend::retry::{IsRetryable, retry_fixed};
//! use ytdlp_frontend::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! let value = retry_fixed(&config, |_attempt, _err: &MyError| {}, || async {
//!     Ok::<_, MyError>(42)
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::{Error, ProcessError};
use std::future::Future;

/// Trait for errors that can be classified as retryable or not
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // The tool ran and failed; listing failures are usually transient
            Error::Process(ProcessError::NonZeroExit { .. } | ProcessError::Crashed) => true,
            // Could not start at all; retrying will not help
            Error::Process(ProcessError::SpawnFailed { .. } | ProcessError::MissingPipe(_)) => {
                false
            }
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::BrokenPipe
            ),
            Error::Config { .. }
            | Error::Validation(_)
            | Error::Resolution(_)
            | Error::Database(_)
            | Error::ShuttingDown
            | Error::Duplicate(_) => false,
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or runs out of attempts
///
/// `on_retry(next_attempt, &error)` is called before each pause so callers can
/// report the retry. Returns the successful value or the last error.
pub async fn retry_fixed<F, Fut, T, E, R>(
    config: &RetryConfig,
    mut on_retry: R,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
    R: FnMut(u32, &E),
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts,
                    delay_ms = config.delay.as_millis() as u64,
                    "Operation failed, retrying"
                );
                on_retry(attempt + 1, &e);
                tokio::time::sleep(config.delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Operation failed after all attempts"
                    );
                } else {
                    tracing::error!(error = %e, "Operation failed with non-retryable error");
                }
                return Err(e);
            }
        }
    }
}
