//! Read-only dashboard queries.

use std::sync::Arc;

use serde::Serialize;

use crate::models::report::{ReportStatus, ReportView};
use crate::persistence::report_repo::ReportRepo;
use crate::persistence::task_repo::TaskRepo;
use crate::persistence::worker_repo::WorkerRepo;
use crate::state::AppState;
use crate::Result;

use super::bounded;

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    /// Registered workers.
    pub workers: i64,
    /// Tasks assigned for today.
    pub tasks_today: i64,
    /// Reports awaiting review.
    pub pending: i64,
    /// Approved reports.
    pub approved: i64,
    /// Rejected reports.
    pub rejected: i64,
}

/// Pending reports with task title and worker name, oldest first.
///
/// # Errors
///
/// Returns `AppError::Db` or `AppError::Timeout` if the store call fails.
pub async fn list_pending(state: &AppState) -> Result<Vec<ReportView>> {
    let repo = ReportRepo::new(Arc::clone(&state.db));
    bounded(
        state.config.upstream_timeout(),
        "pending listing",
        repo.list_pending_views(),
    )
    .await
}

/// Approved and rejected reports with display columns, oldest first.
///
/// # Errors
///
/// Returns `AppError::Db` or `AppError::Timeout` if the store call fails.
pub async fn list_validated(state: &AppState) -> Result<Vec<ReportView>> {
    let repo = ReportRepo::new(Arc::clone(&state.db));
    bounded(
        state.config.upstream_timeout(),
        "validated listing",
        repo.list_validated_views(),
    )
    .await
}

/// Counts of workers, today's tasks, and reports per status.
///
/// # Errors
///
/// Returns `AppError::Db` or `AppError::Timeout` if a store call fails.
pub async fn stats(state: &AppState) -> Result<DashboardStats> {
    let limit = state.config.upstream_timeout();
    let workers = WorkerRepo::new(Arc::clone(&state.db));
    let tasks = TaskRepo::new(Arc::clone(&state.db));
    let reports = ReportRepo::new(Arc::clone(&state.db));

    let mut out = DashboardStats {
        workers: bounded(limit, "worker count", workers.count()).await?,
        tasks_today: bounded(limit, "task listing", tasks.list_for_date(state.today()))
            .await?
            .len()
            .try_into()
            .unwrap_or(i64::MAX),
        ..DashboardStats::default()
    };

    for (status, n) in bounded(limit, "report counts", reports.count_by_status()).await? {
        match status {
            ReportStatus::Pending => out.pending = n,
            ReportStatus::Approved => out.approved = n,
            ReportStatus::Rejected => out.rejected = n,
        }
    }

    Ok(out)
}
