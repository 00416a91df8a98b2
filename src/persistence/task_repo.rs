//! Task repository for `SQLite` persistence.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::warn;

use crate::models::ident::IdScheme;
use crate::models::task::{Task, TaskDraft};
use crate::{AppError, Result};

use super::db::Database;
use super::sequence::{self, SequencedTable};
use super::{date_str, parse_date, parse_timestamp, timestamp_str};

/// Repository wrapper around `SQLite` for task records.
#[derive(Clone)]
pub struct TaskRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    title: String,
    description: Option<String>,
    assigned_date: String,
    created_by: String,
    created_at: String,
}

impl TaskRow {
    fn into_task(self) -> Result<Task> {
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            assigned_date: parse_date("assigned_date", &self.assigned_date)?,
            created_by: self.created_by,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        })
    }
}

impl TaskRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a task under the next free identifier of `ids`.
    ///
    /// A primary-key collision with a concurrent writer triggers a retry
    /// with a recomputed identifier, up to `attempts` inserts in total.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PersistenceFailed` when every attempt collides,
    /// or `AppError::Db` for any other store failure.
    pub async fn create(&self, ids: &IdScheme, attempts: u32, draft: &TaskDraft) -> Result<Task> {
        for attempt in 1..=attempts {
            let last = sequence::last_id(&self.db, SequencedTable::Tasks, &ids.prefix).await?;
            let task = Task::from_draft(ids.next_after(last.as_deref())?, draft);

            match self.insert(&task).await {
                Ok(()) => return Ok(task),
                Err(err) if sequence::is_unique_violation(&err) => {
                    warn!(task_id = %task.id, attempt, "task id collision, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AppError::PersistenceFailed(format!(
            "no free task id after {attempts} attempts"
        )))
    }

    async fn insert(&self, task: &Task) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO tasks (id, title, description, assigned_date, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(date_str(task.assigned_date))
        .bind(&task.created_by)
        .bind(timestamp_str(task.created_at))
        .execute(self.db.as_ref())
        .await?;
        Ok(())
    }

    /// Retrieve a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;

        row.map(TaskRow::into_task).transpose()
    }

    /// Retrieve task `id` only if it is assigned for `date`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn find_assigned(&self, id: &str, date: NaiveDate) -> Result<Option<Task>> {
        let row: Option<TaskRow> =
            sqlx::query_as("SELECT * FROM tasks WHERE id = ?1 AND assigned_date = ?2")
                .bind(id)
                .bind(date_str(date))
                .fetch_optional(self.db.as_ref())
                .await?;

        row.map(TaskRow::into_task).transpose()
    }

    /// All tasks assigned for `date`, in identifier order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT * FROM tasks WHERE assigned_date = ?1 ORDER BY length(id), id",
        )
        .bind(date_str(date))
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// Every task, newest assignment first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT * FROM tasks ORDER BY assigned_date DESC, length(id) DESC, id DESC",
        )
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }
}
