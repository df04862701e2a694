use crate::db::*;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_database_creation() {
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path();

    let db = Database::new(db_path).await.unwrap();

    let mut conn = db.pool.acquire().await.unwrap();

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(&mut *conn)
            .await
            .unwrap();

    assert!(tables.contains(&"bookmarks".to_string()));
    assert!(tables.contains(&"schema_version".to_string()));

    drop(conn);
    db.close().await;
}

#[tokio::test]
async fn test_migrations_are_recorded_once() {
    let temp_file = NamedTempFile::new().unwrap();

    // Opening twice must not re-apply anything
    let db = Database::new(temp_file.path()).await.unwrap();
    db.close().await;
    let db = Database::new(temp_file.path()).await.unwrap();

    let versions: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version")
        .fetch_all(db.pool())
        .await
        .unwrap();
    assert_eq!(versions, vec![1, 2]);

    db.close().await;
}

#[tokio::test]
async fn test_v2_columns_exist() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info('bookmarks')")
        .fetch_all(db.pool())
        .await
        .unwrap();

    for expected in [
        "id",
        "name",
        "url",
        "output_dir",
        "filename_format",
        "output_dir_format",
        "use_subdir",
        "subdir_name",
        "list_limit",
        "selected_format_code",
    ] {
        assert!(columns.contains(&expected.to_string()), "missing column {expected}");
    }

    db.close().await;
}

#[tokio::test]
async fn test_creates_missing_parent_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("nested").join("bookmarks.db");

    let db = Database::new(&path).await.unwrap();
    assert!(path.exists());

    db.close().await;
}

#[tokio::test]
async fn test_open_optional_returns_none_on_failure() {
    let temp_file = NamedTempFile::new().unwrap();
    // A regular file cannot be a parent directory
    let path = temp_file.path().join("bookmarks.db");

    assert!(Database::open_optional(&path).await.is_none());
}
