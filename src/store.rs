use std::path::PathBuf;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

use crate::config::ResolvedStorage;
use crate::error::AppError;
use crate::model::Record;
use crate::time::now_ms;
use crate::{db, schema};

/// Durable CRUD for records against one backing file.
///
/// Reads fail soft: `list_all` returns an empty vec and `count` returns 0
/// when the query fails, so a transient glitch on the shared folder does
/// not take the UI down. The cost is that "no records" and "read error"
/// are indistinguishable to the caller; failures are still logged here.
/// Writes report failure through their return value and never panic.
pub struct RecordStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl RecordStore {
    /// Open the backing file at its resolved location. Fatal on failure.
    pub async fn open(storage: &ResolvedStorage) -> anyhow::Result<Self> {
        let pool = db::open_sqlite_pool(&storage.path).await?;
        info!(
            target: "dunmore",
            event = "store_open",
            path = %storage.path.display(),
            shared = storage.is_shared(),
        );
        Ok(RecordStore {
            pool,
            path: storage.path.clone(),
        })
    }

    /// Wrap an existing pool; used by tests running on in-memory databases.
    pub fn from_pool(pool: SqlitePool) -> Self {
        RecordStore {
            pool,
            path: PathBuf::new(),
        }
    }

    /// Idempotently create the schema. Propagates failure.
    pub async fn initialize(&self) -> anyhow::Result<()> {
        schema::apply_schema(&self.pool).await
    }

    /// Path of the backing file this store was opened against.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Insert a new record, ignoring any caller-supplied id or timestamps.
    /// Returns the store-assigned identifier, or `None` when the write
    /// failed.
    pub async fn create(&self, record: &Record) -> Option<i64> {
        let now = now_ms();
        let result = sqlx::query(
            "INSERT INTO records \
               (name, email, phone, company, position, notes, created_at, updated_at, created_by) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.name)
        .bind(record.email.as_deref())
        .bind(record.phone.as_deref())
        .bind(record.company.as_deref())
        .bind(record.position.as_deref())
        .bind(record.notes.as_deref())
        .bind(now)
        .bind(now)
        .bind(record.created_by.as_deref().unwrap_or("Unknown"))
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_rowid();
                info!(target: "dunmore", event = "record_created", id);
                Some(id)
            }
            Err(e) => {
                AppError::from(e)
                    .with_context("operation", "create")
                    .log_with_event("record_create_failed");
                None
            }
        }
    }

    /// Every record, most recently touched first. Rows written within the
    /// same millisecond tie-break on id so the newest row still sorts first.
    pub async fn list_all(&self) -> Vec<Record> {
        let rows = sqlx::query(
            "SELECT id, name, email, phone, company, position, notes, \
                    created_at, updated_at, created_by \
             FROM records \
             ORDER BY updated_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await;

        match rows {
            Ok(rows) => rows.iter().filter_map(record_from_row).collect(),
            Err(e) => {
                warn!(target: "dunmore", event = "record_list_failed", error = %e);
                Vec::new()
            }
        }
    }

    /// Full overwrite of the mutable fields by identifier. `updated_at` is
    /// refreshed by the schema trigger; the caller's value is ignored, as
    /// are `created_at` and `created_by`. Returns whether a row matched.
    pub async fn update(&self, record: &Record) -> bool {
        let result = sqlx::query(
            "UPDATE records \
             SET name = ?, email = ?, phone = ?, company = ?, position = ?, notes = ? \
             WHERE id = ?",
        )
        .bind(&record.name)
        .bind(record.email.as_deref())
        .bind(record.phone.as_deref())
        .bind(record.company.as_deref())
        .bind(record.position.as_deref())
        .bind(record.notes.as_deref())
        .bind(record.id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let hit = done.rows_affected() > 0;
                if hit {
                    info!(target: "dunmore", event = "record_updated", id = record.id);
                }
                hit
            }
            Err(e) => {
                AppError::from(e)
                    .with_context("operation", "update")
                    .with_context("id", record.id.to_string())
                    .log_with_event("record_update_failed");
                false
            }
        }
    }

    /// Hard delete by identifier. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> bool {
        let result = sqlx::query("DELETE FROM records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => {
                let hit = done.rows_affected() > 0;
                if hit {
                    info!(target: "dunmore", event = "record_deleted", id);
                }
                hit
            }
            Err(e) => {
                AppError::from(e)
                    .with_context("operation", "delete")
                    .with_context("id", id.to_string())
                    .log_with_event("record_delete_failed");
                false
            }
        }
    }

    /// A sequence of independent single-row deletes, not atomic as a unit:
    /// a mid-batch failure leaves earlier deletions in place. Returns the
    /// count actually removed so the caller can report it.
    pub async fn delete_many(&self, ids: &[i64]) -> usize {
        let mut removed = 0;
        for &id in ids {
            if self.delete(id).await {
                removed += 1;
            }
        }
        removed
    }

    /// Total record count, 0 on read failure.
    pub async fn count(&self) -> i64 {
        match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM records")
            .fetch_one(&self.pool)
            .await
        {
            Ok(n) => n,
            Err(e) => {
                warn!(target: "dunmore", event = "record_count_failed", error = %e);
                0
            }
        }
    }
}

fn record_from_row(row: &SqliteRow) -> Option<Record> {
    let record = Record {
        id: row.try_get("id").ok()?,
        name: row.try_get("name").ok()?,
        email: row.try_get("email").ok()?,
        phone: row.try_get("phone").ok()?,
        company: row.try_get("company").ok()?,
        position: row.try_get("position").ok()?,
        notes: row.try_get("notes").ok()?,
        created_at: row.try_get("created_at").ok()?,
        updated_at: row.try_get("updated_at").ok()?,
        created_by: row.try_get("created_by").ok()?,
    };
    Some(record)
}
