//! Files the orchestrator writes outside of jobs: option files and the bookmark store.

use super::Orchestrator;
use crate::command;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::options::Options;
use std::path::PathBuf;

impl Orchestrator {
    /// Write the option file for `options` to `tools.config_file_path`
    ///
    /// By default that is yt-dlp's own per-user config file, so later runs of the
    /// tool outside this crate pick the options up. Missing directories are created.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the path was cleared (or the platform has no user
    /// config directory), or the I/O error of the write.
    pub async fn save_tool_config(&self, options: &Options) -> Result<PathBuf> {
        let Some(path) = &self.config.tools.config_file_path else {
            return Err(Error::Config {
                message: "no option file path configured".to_string(),
                key: Some("tools.config_file_path".to_string()),
            });
        };
        command::save_config_file(options, path).await
    }

    /// Open the bookmark store at `persistence.database_path`
    ///
    /// `None` when it cannot be opened; the failure is logged and everything else
    /// keeps working.
    pub async fn open_bookmarks(&self) -> Option<Database> {
        Database::open_optional(&self.config.persistence.database_path).await
    }
}
