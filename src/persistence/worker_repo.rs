//! Worker repository for `SQLite` persistence.

use std::sync::Arc;

use crate::models::worker::{Registration, Role, Worker};
use crate::{AppError, Result};

use super::db::Database;
use super::{parse_timestamp, timestamp_str};

/// Repository wrapper around `SQLite` for worker records.
#[derive(Clone)]
pub struct WorkerRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct WorkerRow {
    id: String,
    name: String,
    telegram_id: i64,
    role: String,
    created_at: String,
}

impl WorkerRow {
    fn into_worker(self) -> Result<Worker> {
        let role = match self.role.as_str() {
            "worker" => Role::Worker,
            "supervisor" => Role::Supervisor,
            other => return Err(AppError::Db(format!("invalid role: {other}"))),
        };
        Ok(Worker {
            id: self.id,
            name: self.name,
            telegram_id: self.telegram_id,
            role,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        })
    }
}

impl WorkerRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Look up a worker by chat identity.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Worker>> {
        let row: Option<WorkerRow> = sqlx::query_as("SELECT * FROM users WHERE telegram_id = ?1")
            .bind(telegram_id)
            .fetch_optional(self.db.as_ref())
            .await?;

        row.map(WorkerRow::into_worker).transpose()
    }

    /// Insert `worker` unless its chat identity is already registered.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert or follow-up lookup fails.
    pub async fn register(&self, worker: &Worker) -> Result<Registration> {
        let inserted = sqlx::query(
            "INSERT INTO users (id, name, telegram_id, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(telegram_id) DO NOTHING",
        )
        .bind(&worker.id)
        .bind(&worker.name)
        .bind(worker.telegram_id)
        .bind(worker.role.as_str())
        .bind(timestamp_str(worker.created_at))
        .execute(self.db.as_ref())
        .await?
        .rows_affected();

        if inserted == 1 {
            return Ok(Registration::Created(worker.clone()));
        }

        let existing = self
            .find_by_telegram_id(worker.telegram_id)
            .await?
            .ok_or_else(|| AppError::Db("worker vanished after conflicting insert".into()))?;
        Ok(Registration::AlreadyRegistered(existing))
    }

    /// Number of registered workers.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn count(&self) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'worker'")
            .fetch_one(self.db.as_ref())
            .await?;
        Ok(n)
    }
}
