use crate::db::*;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_new_database_creates_schema() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    // A fresh database should accept inserts right away
    let video = db
        .upsert_video(&NewVideo {
            id: "7311000000000000001".to_string(),
            date: 1_700_000_000,
            author: None,
        })
        .await
        .unwrap();

    assert_eq!(video.id, "7311000000000000001");
    assert_eq!(video.status, "new");
    assert!(video.last_checked.is_none());
    assert!(video.message_id.is_none());
    assert!(video.created_at > 0);

    db.close().await;
}

#[tokio::test]
async fn test_reopening_database_is_idempotent() {
    let temp_file = NamedTempFile::new().unwrap();

    {
        let db = Database::new(temp_file.path()).await.unwrap();
        db.upsert_video(&NewVideo {
            id: "vid-1".to_string(),
            date: 100,
            author: Some("alice".to_string()),
        })
        .await
        .unwrap();
        db.close().await;
    }

    // Re-running migrations against an existing schema must not fail
    // and must preserve existing rows
    let db = Database::new(temp_file.path()).await.unwrap();
    let video = db.get_video("vid-1").await.unwrap().unwrap();
    assert_eq!(video.author.as_deref(), Some("alice"));
    db.close().await;
}

#[tokio::test]
async fn test_creates_parent_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("nested").join("deeper").join("archive.db");

    let db = Database::new(&db_path).await.unwrap();
    assert!(db_path.parent().unwrap().exists());
    db.close().await;
}
