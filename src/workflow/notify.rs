//! Background sweep telling workers about review outcomes.
//!
//! Runs on a fixed interval. Each tick finds reviewed reports not yet
//! announced, messages the submitting worker, and marks the report as
//! notified. A failed delivery leaves the flag unset so the next tick
//! tries again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::models::report::{Report, ReviewState};
use crate::persistence::report_repo::ReportRepo;
use crate::state::AppState;
use crate::Result;

use super::bounded;

/// Spawn the review notification background task.
#[must_use]
pub fn spawn_notify_task(state: Arc<AppState>, cancel: CancellationToken) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config.timeouts.notify_interval_seconds);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("notify task shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(err) = notify_reviewed(&state).await {
                        error!(%err, "review notification sweep failed");
                    }
                }
            }
        }
    })
}

/// Deliver every pending review notification once.
///
/// Returns the number of workers notified. Without a chat transport
/// nothing is sent and nothing is marked.
///
/// # Errors
///
/// Returns `AppError::Db` or `AppError::Timeout` if the store cannot be read.
pub async fn notify_reviewed(state: &AppState) -> Result<usize> {
    let Some(chat) = state.chat.as_ref() else {
        return Ok(0);
    };
    let limit = state.config.upstream_timeout();
    let repo = ReportRepo::new(Arc::clone(&state.db));

    let mut sent = 0;
    for report in bounded(limit, "unnotified listing", repo.list_unnotified_reviews()).await? {
        let Some(text) = outcome_message(&report) else {
            continue;
        };

        let delivered = bounded(
            limit,
            "review notice",
            chat.send_text(report.submitted_by, &text),
        )
        .await;
        if let Err(err) = delivered {
            warn!(report_id = %report.id, %err, "review notice not delivered");
            continue;
        }

        sent += 1;
        if let Err(err) = bounded(limit, "notified flag", repo.mark_notified(&report.id)).await {
            warn!(report_id = %report.id, %err, "review notice sent but not marked");
        }
    }

    if sent > 0 {
        info!(sent, "review notifications delivered");
    }
    Ok(sent)
}

/// Chat text announcing the review outcome of `report`.
#[must_use]
pub fn outcome_message(report: &Report) -> Option<String> {
    match &report.review {
        ReviewState::Pending => None,
        ReviewState::Approved { .. } => Some(format!(
            "Your report {} for {} has been approved.",
            report.id, report.task_id
        )),
        ReviewState::Rejected { reason, .. } => Some(format!(
            "Your report {} for {} was rejected: {reason}\nPlease redo the task and report again.",
            report.id, report.task_id
        )),
    }
}
