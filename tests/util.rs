#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use std::path::PathBuf;

use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

use dunmore::config::{ResolvedStorage, StorageLocation};
use dunmore::{Record, RecordStore};

/// File-backed store in a fresh temp directory. Keep the `TempDir` alive
/// for as long as the store is used.
pub async fn temp_store() -> (TempDir, RecordStore) {
    let dir = TempDir::new().expect("tempdir");
    let storage = ResolvedStorage {
        path: dir.path().join("records.sqlite3"),
        location: StorageLocation::LocalFallback,
    };
    let store = RecordStore::open(&storage).await.expect("open store");
    store.initialize().await.expect("initialize schema");
    (dir, store)
}

/// In-memory store; a single connection so the schema survives.
pub async fn memory_store() -> RecordStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect sqlite::memory:");
    let store = RecordStore::from_pool(pool);
    store.initialize().await.expect("initialize schema");
    store
}

pub fn sample_record(name: &str) -> Record {
    Record {
        email: Some(format!(
            "{}@example.com",
            name.to_lowercase().replace(' ', ".")
        )),
        phone: Some("555-0100-200".to_string()),
        company: Some("Acme".to_string()),
        position: Some("Engineer".to_string()),
        notes: Some("met at the trade fair".to_string()),
        created_by: Some("tester".to_string()),
        ..Record::named(name)
    }
}

pub fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("records.sqlite3")
}
