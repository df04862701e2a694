//! Shared test helpers for driving an Orchestrator against a fake `yt-dlp`.

use crate::config::{Config, RetryConfig};
use crate::options::Options;
use crate::orchestrator::Orchestrator;
use crate::resolver::ListingSource;
use crate::types::Event;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use tokio::sync::broadcast;

/// Fake tool and an output directory inside one temp dir
pub(crate) struct TestEnv {
    pub(crate) orchestrator: Orchestrator,
    pub(crate) output_dir: PathBuf,
    pub(crate) _temp: TempDir,
}

/// Write an executable shell script standing in for `yt-dlp`
#[cfg(unix)]
pub(crate) fn write_fake_tool(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-yt-dlp");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn test_config(tool: PathBuf) -> Config {
    let mut config = Config::default();
    config.tools.ytdlp_path = Some(tool);
    config.tools.search_path = false;
    config.retry = RetryConfig {
        max_attempts: 3,
        delay: Duration::from_millis(10),
    };
    config.cancel_grace = Duration::from_millis(500);
    config
}

/// Orchestrator running `body` as its tool; `{out}` in the body is replaced by the output dir
#[cfg(unix)]
pub(crate) fn create_test_env(body: &str) -> TestEnv {
    let temp = tempdir().unwrap();
    let output_dir = temp.path().join("out");
    std::fs::create_dir_all(&output_dir).unwrap();
    let body = body.replace("{out}", &output_dir.display().to_string());
    let tool = write_fake_tool(temp.path(), &body);

    TestEnv {
        orchestrator: Orchestrator::new(test_config(tool)),
        output_dir,
        _temp: temp,
    }
}

/// Same as [`create_test_env`] but resolving channel selections through `source`
#[cfg(unix)]
pub(crate) fn create_test_env_with_source(body: &str, source: Arc<dyn ListingSource>) -> TestEnv {
    let env = create_test_env(body);
    let config = env.orchestrator.config().clone();
    TestEnv {
        orchestrator: Orchestrator::with_listing_source(config, source),
        ..env
    }
}

/// Options downloading `urls` straight into `output_dir`
pub(crate) fn options_for(output_dir: &Path, urls: &str) -> Options {
    let mut options = Options::default();
    options.urls = urls.to_string();
    options.output.output_dir = output_dir.display().to_string();
    options.output.use_subdir = false;
    options
}

/// Receive events until one matches `pred`, failing after a few seconds
pub(crate) async fn wait_for<F>(rx: &mut broadcast::Receiver<Event>, mut pred: F) -> Event
where
    F: FnMut(&Event) -> bool,
{
    let wait = async {
        loop {
            match rx.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(e) => panic!("event channel closed: {e}"),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(10), wait)
        .await
        .expect("timed out waiting for event")
}

/// Every event received up to and including the first one matching `pred`
pub(crate) async fn collect_until<F>(rx: &mut broadcast::Receiver<Event>, mut pred: F) -> Vec<Event>
where
    F: FnMut(&Event) -> bool,
{
    let mut events = Vec::new();
    wait_for(rx, |event| {
        events.push(event.clone());
        pred(event)
    })
    .await;
    events
}

/// Everything already queued on `rx`
pub(crate) fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
