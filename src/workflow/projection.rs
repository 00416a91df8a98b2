//! Today's task list with each task's latest report status for one worker.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};

use crate::models::report::{Report, ReportStatus};
use crate::models::task::Task;
use crate::persistence::report_repo::ReportRepo;
use crate::persistence::task_repo::TaskRepo;
use crate::persistence::worker_repo::WorkerRepo;
use crate::state::AppState;
use crate::{AppError, Result};

use super::{bounded, local_date};

/// Reply text when no task is assigned for today.
pub const NO_TASKS_TODAY: &str = "No tasks today.";

/// Progress of one task from the worker's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskProgress {
    /// No report from this worker today.
    NotStarted,
    /// Latest report today carries this status.
    Reported(ReportStatus),
}

impl Display for TaskProgress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => f.write_str("not yet worked on"),
            Self::Reported(status) => write!(f, "{status}"),
        }
    }
}

/// One line of the `/task` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatusLine {
    /// Task identifier.
    pub task_id: String,
    /// Task title.
    pub title: String,
    /// Worker's progress on the task.
    pub progress: TaskProgress,
    /// Report the progress was taken from.
    pub report_id: Option<String>,
}

impl Display for TaskStatusLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} — {}: {}", self.task_id, self.progress, self.title)
    }
}

/// Combine today's tasks with the worker's reports.
///
/// `reports` must be ordered most recent first. Only reports whose local
/// submission date is `today` count; the first one per task wins.
#[must_use]
pub fn project(
    tasks: &[Task],
    reports: &[Report],
    today: NaiveDate,
    offset: FixedOffset,
) -> Vec<TaskStatusLine> {
    let mut latest: HashMap<&str, &Report> = HashMap::new();
    for report in reports
        .iter()
        .filter(|r| local_date(r.submitted_at, offset) == today)
    {
        latest.entry(report.task_id.as_str()).or_insert(report);
    }

    tasks
        .iter()
        .map(|task| {
            let found = latest.get(task.id.as_str());
            TaskStatusLine {
                task_id: task.id.clone(),
                title: task.title.clone(),
                progress: found.map_or(TaskProgress::NotStarted, |r| {
                    TaskProgress::Reported(r.status())
                }),
                report_id: found.map(|r| r.id.clone()),
            }
        })
        .collect()
}

/// Render projection lines as a chat reply.
#[must_use]
pub fn render(lines: &[TaskStatusLine]) -> String {
    if lines.is_empty() {
        return NO_TASKS_TODAY.to_owned();
    }
    let body = lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    format!("Today's tasks:\n{body}")
}

/// Build the `/task` projection for a registered worker.
///
/// # Errors
///
/// - `AppError::NotRegistered` when the chat identity is unknown.
/// - `AppError::ProjectionFetchFailed` when tasks or reports cannot be read.
/// - `AppError::Timeout` when a store call exceeds its bound.
pub async fn task_status(
    state: &AppState,
    telegram_id: i64,
    today: NaiveDate,
) -> Result<Vec<TaskStatusLine>> {
    let limit = state.config.upstream_timeout();
    let workers = WorkerRepo::new(Arc::clone(&state.db));
    let tasks = TaskRepo::new(Arc::clone(&state.db));
    let reports = ReportRepo::new(Arc::clone(&state.db));

    let worker = bounded(limit, "worker lookup", workers.find_by_telegram_id(telegram_id))
        .await
        .map_err(fetch_failure)?;
    if worker.is_none() {
        return Err(AppError::NotRegistered(format!(
            "telegram id {telegram_id} has no worker record"
        )));
    }

    let todays = bounded(limit, "task listing", tasks.list_for_date(today))
        .await
        .map_err(fetch_failure)?;
    let mine = bounded(limit, "report listing", reports.list_by_submitter(telegram_id))
        .await
        .map_err(fetch_failure)?;

    Ok(project(&todays, &mine, today, state.config.local_offset()))
}

fn fetch_failure(err: AppError) -> AppError {
    match err {
        AppError::Timeout(_) => err,
        other => AppError::ProjectionFetchFailed(other.to_string()),
    }
}
