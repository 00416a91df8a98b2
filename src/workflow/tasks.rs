//! Supervisor task creation and listing.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::feed::StoreChange;
use crate::models::task::{NewTask, Task, TaskDraft};
use crate::persistence::task_repo::TaskRepo;
use crate::state::AppState;
use crate::{AppError, Result};

use super::bounded;

/// Create a task under the next `TASK` identifier.
///
/// The assignment date defaults to today and the creator to the
/// placeholder reviewer identity.
///
/// # Errors
///
/// - `AppError::Validation` when the title is blank.
/// - `AppError::PersistenceFailed` when the task cannot be stored.
/// - `AppError::Timeout` when the store call exceeds its bound.
pub async fn create_task(state: &AppState, input: NewTask) -> Result<Task> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("task title is required".into()));
    }

    let draft = TaskDraft {
        title: title.to_owned(),
        description: input
            .description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty()),
        assigned_date: input.assigned_date.unwrap_or_else(|| state.today()),
        created_by: input
            .created_by
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| state.config.reports.placeholder_reviewer.clone()),
        created_at: Utc::now(),
    };

    let repo = TaskRepo::new(Arc::clone(&state.db));
    let task = bounded(
        state.config.upstream_timeout(),
        "task insert",
        repo.create(
            &state.config.tasks.ids(),
            state.config.reports.insert_attempts,
            &draft,
        ),
    )
    .await
    .map_err(|err| match err {
        AppError::Timeout(_) | AppError::PersistenceFailed(_) => err,
        other => AppError::PersistenceFailed(format!("task insert: {other}")),
    })?;

    info!(task_id = %task.id, assigned_date = %task.assigned_date, "task created");
    state.changes.publish(StoreChange::TaskCreated {
        task_id: task.id.clone(),
    });

    Ok(task)
}

/// Tasks assigned for `date`, or every task when `date` is `None`.
///
/// # Errors
///
/// Returns `AppError::Db` or `AppError::Timeout` if the store call fails.
pub async fn list_tasks(state: &AppState, date: Option<NaiveDate>) -> Result<Vec<Task>> {
    let repo = TaskRepo::new(Arc::clone(&state.db));
    let limit = state.config.upstream_timeout();
    match date {
        Some(date) => bounded(limit, "task listing", repo.list_for_date(date)).await,
        None => bounded(limit, "task listing", repo.list_all()).await,
    }
}
