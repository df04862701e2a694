//! Database layer for ytdlp-frontend
//!
//! Handles SQLite persistence for bookmarks: a named URL together with the output
//! settings and listing limit that were active when it was saved.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`bookmarks`] - Bookmark CRUD
//!
//! The store is never required: [`Database::open_optional`] logs a failure and
//! returns `None`, and the rest of the crate keeps working without bookmarks.

use crate::options::{DEFAULT_SUBDIR_NAME, ListLimit, Options};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, sqlite::SqlitePool};

mod bookmarks;
mod migrations;

/// New bookmark to be inserted into the database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBookmark {
    /// Display name (must not be blank)
    pub name: String,
    /// Bookmarked URL, unique across the store
    pub url: String,
    /// Base output directory
    pub output_dir: String,
    /// Filename template
    pub filename_format: String,
    /// Output directory template
    pub output_dir_format: String,
    /// Whether downloads go into a subdirectory
    pub use_subdir: bool,
    /// Subdirectory name
    pub subdir_name: String,
    /// Channel list limit
    pub list_limit: ListLimit,
    /// Format code (`-f`)
    pub format_code: String,
}

impl NewBookmark {
    /// Capture the first URL and output settings of an options snapshot under `name`
    pub fn from_options(name: &str, options: &Options) -> Self {
        Self {
            name: name.trim().to_string(),
            url: options.url_list().into_iter().next().unwrap_or_default(),
            output_dir: options.output.output_dir.clone(),
            filename_format: options.output.filename_format.clone(),
            output_dir_format: options.output.output_dir_format.clone(),
            use_subdir: options.output.use_subdir,
            subdir_name: options.output.subdir_name.clone(),
            list_limit: options.channel.list_limit,
            format_code: options.format.code.clone(),
        }
    }
}

/// Bookmark record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Unique database ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Bookmarked URL
    pub url: String,
    /// Base output directory
    pub output_dir: String,
    /// Filename template
    pub filename_format: String,
    /// Output directory template
    pub output_dir_format: String,
    /// Whether downloads go into a subdirectory
    pub use_subdir: bool,
    /// Subdirectory name
    pub subdir_name: String,
    /// Channel list limit
    pub list_limit: ListLimit,
    /// Format code (`-f`)
    pub format_code: String,
}

impl Bookmark {
    /// Load this bookmark into an options snapshot
    ///
    /// The URL field is replaced by the bookmarked URL. A blank stored filename
    /// leaves the current one in place; a blank subdirectory name falls back to
    /// the default.
    pub fn apply_to(&self, options: &mut Options) {
        options.urls = self.url.clone();
        options.output.output_dir = self.output_dir.clone();
        if !self.filename_format.trim().is_empty() {
            options.output.filename_format = self.filename_format.clone();
        }
        options.output.output_dir_format = self.output_dir_format.clone();
        options.output.use_subdir = self.use_subdir;
        options.output.subdir_name = match self.subdir_name.trim() {
            "" => DEFAULT_SUBDIR_NAME.to_string(),
            name => name.to_string(),
        };
        options.channel.list_limit = self.list_limit;
        options.format.code = self.format_code.clone();
    }
}

/// Bookmark record from database (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub struct BookmarkRow {
    /// Unique database ID
    pub id: i64,
    /// Display name
    pub name: String,
    /// Bookmarked URL
    pub url: String,
    /// Base output directory
    pub output_dir: Option<String>,
    /// Filename template
    pub filename_format: Option<String>,
    /// Output directory template
    pub output_dir_format: Option<String>,
    /// Subdirectory flag (0 = no, 1 = yes)
    pub use_subdir: Option<i32>,
    /// Subdirectory name
    pub subdir_name: Option<String>,
    /// Channel list limit as text (`All`, `250`, ...)
    pub list_limit: Option<String>,
    /// Format code
    pub selected_format_code: Option<String>,
}

impl From<BookmarkRow> for Bookmark {
    fn from(row: BookmarkRow) -> Self {
        let list_limit = match row.list_limit.as_deref().map(str::parse::<ListLimit>) {
            Some(Ok(limit)) => limit,
            Some(Err(e)) => {
                tracing::warn!(bookmark_id = row.id, error = %e, "Ignoring stored list limit");
                ListLimit::All
            }
            None => ListLimit::All,
        };

        Bookmark {
            id: row.id,
            name: row.name,
            url: row.url,
            output_dir: row.output_dir.unwrap_or_default(),
            filename_format: row.filename_format.unwrap_or_default(),
            output_dir_format: row.output_dir_format.unwrap_or_default(),
            use_subdir: row.use_subdir.unwrap_or(1) != 0,
            subdir_name: row.subdir_name.unwrap_or_default(),
            list_limit,
            format_code: row.selected_format_code.unwrap_or_default(),
        }
    }
}

/// Database handle for ytdlp-frontend
pub struct Database {
    pool: SqlitePool,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
