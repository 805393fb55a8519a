use sqlx::SqlitePool;
use tracing::{error, info};

/// The schema is three statements and a covering index; each is guarded
/// with IF NOT EXISTS so initialization can run on every startup.
static SCHEMA: &[(&str, &str)] = &[
    (
        "records",
        "CREATE TABLE IF NOT EXISTS records (\
           id         INTEGER PRIMARY KEY AUTOINCREMENT,\
           name       TEXT NOT NULL,\
           email      TEXT,\
           phone      TEXT,\
           company    TEXT,\
           position   TEXT,\
           notes      TEXT,\
           created_at INTEGER NOT NULL,\
           updated_at INTEGER NOT NULL,\
           created_by TEXT DEFAULT 'Unknown'\
         )",
    ),
    (
        "app_meta",
        // Reserved bookkeeping table; created but not yet read or written.
        "CREATE TABLE IF NOT EXISTS app_meta (\
           key        TEXT PRIMARY KEY,\
           value      TEXT,\
           updated_at INTEGER\
         )",
    ),
    (
        "records_touch_updated_at",
        // julianday expression yields epoch millis, same convention as now_ms()
        "CREATE TRIGGER IF NOT EXISTS records_touch_updated_at \
         AFTER UPDATE ON records FOR EACH ROW \
         BEGIN \
           UPDATE records \
             SET updated_at = CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER) \
             WHERE id = NEW.id; \
         END",
    ),
    (
        "idx_records_updated_at",
        "CREATE INDEX IF NOT EXISTS idx_records_updated_at ON records(updated_at)",
    ),
];

/// Idempotently create the schema. Failure here is fatal to the caller;
/// the application cannot run without its store.
pub async fn apply_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    for (name, sql) in SCHEMA {
        if let Err(e) = sqlx::query(sql).execute(pool).await {
            error!(target: "dunmore", event = "schema_stmt_error", stmt = %name, error = %e);
            return Err(e.into());
        }
        info!(target: "dunmore", event = "schema_stmt", stmt = %name);
    }
    Ok(())
}
