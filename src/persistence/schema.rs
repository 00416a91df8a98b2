//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS`, so the bootstrap
//! runs on every server startup.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS users (
    id              TEXT PRIMARY KEY NOT NULL,
    name            TEXT NOT NULL,
    telegram_id     INTEGER NOT NULL UNIQUE,
    role            TEXT NOT NULL CHECK(role IN ('worker','supervisor')),
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id              TEXT PRIMARY KEY NOT NULL,
    title           TEXT NOT NULL,
    description     TEXT,
    assigned_date   TEXT NOT NULL,
    created_by      TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS task_reports (
    id              TEXT PRIMARY KEY NOT NULL,
    task_id         TEXT NOT NULL REFERENCES tasks(id),
    submitted_by    INTEGER NOT NULL,
    photo_url       TEXT,
    status          TEXT NOT NULL CHECK(status IN ('pending','approved','rejected')),
    keterangan      TEXT,
    submitted_at    TEXT NOT NULL,
    reviewed_at     TEXT,
    reviewed_by     TEXT NOT NULL,
    review_notes    TEXT,
    notified        INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_tasks_assigned_date ON tasks(assigned_date);
CREATE INDEX IF NOT EXISTS idx_reports_submitter ON task_reports(submitted_by, submitted_at);
CREATE INDEX IF NOT EXISTS idx_reports_status ON task_reports(status);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
