//! Bookmark CRUD operations.

use crate::error::{DatabaseError, ValidationError};
use crate::{Error, Result};

use super::{Bookmark, BookmarkRow, Database, NewBookmark};

const SELECT_BOOKMARK: &str = r#"
    SELECT id, name, url, output_dir, filename_format, output_dir_format,
           use_subdir, subdir_name, list_limit, selected_format_code
    FROM bookmarks
"#;

impl Database {
    /// Insert a new bookmark
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyBookmarkName`] for a blank name
    /// - [`Error::Duplicate`] when the URL is already bookmarked
    pub async fn insert_bookmark(&self, bookmark: &NewBookmark) -> Result<i64> {
        let name = bookmark.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyBookmarkName.into());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO bookmarks (name, url, output_dir, filename_format, output_dir_format,
                                   use_subdir, subdir_name, list_limit, selected_format_code)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(bookmark.url.trim())
        .bind(&bookmark.output_dir)
        .bind(&bookmark.filename_format)
        .bind(&bookmark.output_dir_format)
        .bind(bookmark.use_subdir as i32)
        .bind(&bookmark.subdir_name)
        .bind(bookmark.list_limit.to_string())
        .bind(&bookmark.format_code)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                Error::Duplicate(format!("bookmark for {}", bookmark.url.trim()))
            }
            _ => Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert bookmark: {}",
                e
            ))),
        })?;

        let id = result.last_insert_rowid();
        tracing::info!(bookmark_id = id, name, "Bookmark saved");
        Ok(id)
    }

    /// All bookmarks, ordered by name
    pub async fn list_bookmarks(&self) -> Result<Vec<Bookmark>> {
        let rows = sqlx::query_as::<_, BookmarkRow>(&format!(
            "{} ORDER BY name COLLATE NOCASE ASC, id ASC",
            SELECT_BOOKMARK
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list bookmarks: {}",
                e
            )))
        })?;

        Ok(rows.into_iter().map(Bookmark::from).collect())
    }

    /// Get the bookmark for a URL
    pub async fn get_bookmark(&self, url: &str) -> Result<Option<Bookmark>> {
        let row = sqlx::query_as::<_, BookmarkRow>(&format!("{} WHERE url = ?", SELECT_BOOKMARK))
            .bind(url.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to get bookmark: {}",
                    e
                )))
            })?;

        Ok(row.map(Bookmark::from))
    }

    /// Overwrite every field of an existing bookmark
    ///
    /// Returns `false` when no bookmark has `bookmark.id`.
    pub async fn update_bookmark(&self, bookmark: &Bookmark) -> Result<bool> {
        let name = bookmark.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyBookmarkName.into());
        }

        let result = sqlx::query(
            r#"
            UPDATE bookmarks
            SET name = ?, url = ?, output_dir = ?, filename_format = ?, output_dir_format = ?,
                use_subdir = ?, subdir_name = ?, list_limit = ?, selected_format_code = ?
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(bookmark.url.trim())
        .bind(&bookmark.output_dir)
        .bind(&bookmark.filename_format)
        .bind(&bookmark.output_dir_format)
        .bind(bookmark.use_subdir as i32)
        .bind(&bookmark.subdir_name)
        .bind(bookmark.list_limit.to_string())
        .bind(&bookmark.format_code)
        .bind(bookmark.id)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                Error::Duplicate(format!("bookmark for {}", bookmark.url.trim()))
            }
            _ => Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to update bookmark: {}",
                e
            ))),
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a bookmark by ID
    pub async fn delete_bookmark(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete bookmark: {}",
                    e
                )))
            })?;

        if result.rows_affected() > 0 {
            tracing::info!(bookmark_id = id, "Bookmark deleted");
        }
        Ok(result.rows_affected() > 0)
    }
}
