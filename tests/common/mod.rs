//! Common test utilities for ytdlp-frontend integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;
use ytdlp_frontend::{Config, Event, Options, Orchestrator};

/// Write an executable shell script standing in for `yt-dlp`
#[cfg(unix)]
pub fn write_fake_tool(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("yt-dlp");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Orchestrator running a fake tool, plus the temp dir holding it and an `out/` directory
#[cfg(unix)]
pub fn create_fake_orchestrator(body: &str) -> (Orchestrator, PathBuf, TempDir) {
    let temp = tempfile::tempdir().unwrap();
    let output_dir = temp.path().join("out");
    std::fs::create_dir_all(&output_dir).unwrap();
    let tool = write_fake_tool(temp.path(), &body.replace("{out}", &output_dir.display().to_string()));

    let mut config = Config::default();
    config.tools.ytdlp_path = Some(tool);
    config.cancel_grace = Duration::from_millis(500);
    config.persistence.database_path = temp.path().join("bookmarks.db");
    (Orchestrator::new(config), output_dir, temp)
}

/// Options downloading `urls` straight into `output_dir`
pub fn options_for(output_dir: &Path, urls: &str) -> Options {
    let mut options = Options::default();
    options.urls = urls.to_string();
    options.output.output_dir = output_dir.display().to_string();
    options.output.use_subdir = false;
    options
}

/// Receive events until one matches `pred`, returning everything received
pub async fn events_until<F>(rx: &mut broadcast::Receiver<Event>, mut pred: F) -> Vec<Event>
where
    F: FnMut(&Event) -> bool,
{
    let mut events = Vec::new();
    let collect = async {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let done = pred(&event);
                    events.push(event);
                    if done {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(e) => panic!("event channel closed: {e}"),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(30), collect)
        .await
        .expect("timed out waiting for event");
    events
}
