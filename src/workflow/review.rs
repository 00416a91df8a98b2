//! Supervisor review of pending reports.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::feed::StoreChange;
use crate::models::report::{Report, ReviewDecision, Transition};
use crate::persistence::report_repo::ReportRepo;
use crate::state::AppState;
use crate::{AppError, Result};

use super::bounded;

/// Apply `decision` to report `id` and return the stored report.
///
/// Only a pending report changes. Repeating the decision a report already
/// carries returns it untouched; the opposite decision is refused.
/// `reviewer` falls back to the configured placeholder identity.
///
/// # Errors
///
/// - `AppError::NotFound` when no report has this identifier.
/// - `AppError::AlreadyReviewed` when the report carries the other decision.
/// - `AppError::ReviewUpdateFailed` when the store read or write fails.
/// - `AppError::Timeout` when a store call exceeds its bound.
pub async fn review_report(
    state: &AppState,
    id: &str,
    decision: &ReviewDecision,
    reviewer: Option<&str>,
) -> Result<Report> {
    let limit = state.config.upstream_timeout();
    let repo = ReportRepo::new(Arc::clone(&state.db));
    let reviewer = reviewer
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(state.config.reports.placeholder_reviewer.as_str());

    let current = fetch(&repo, id, limit).await?;
    let next = match current.review.transition(decision, reviewer, Utc::now())? {
        Transition::Unchanged => {
            info!(report_id = %id, status = %current.status(), "review repeated, nothing to do");
            return Ok(current);
        }
        Transition::Applied(next) => next,
    };

    let applied = bounded(limit, "review update", repo.apply_review(id, &next))
        .await
        .map_err(review_failure)?;

    if !applied {
        // A concurrent reviewer got there first; judge against what they wrote.
        let latest = fetch(&repo, id, limit).await?;
        return match latest.review.transition(decision, reviewer, Utc::now())? {
            Transition::Unchanged => Ok(latest),
            Transition::Applied(_) => Err(AppError::ReviewUpdateFailed(format!(
                "report {id} did not accept the review"
            ))),
        };
    }

    let updated = Report {
        review: next,
        ..current
    };

    info!(
        report_id = %updated.id,
        status = %updated.status(),
        reviewer,
        "report reviewed"
    );
    state.changes.publish(StoreChange::ReportReviewed {
        report_id: updated.id.clone(),
        status: updated.status(),
    });

    Ok(updated)
}

async fn fetch(repo: &ReportRepo, id: &str, limit: std::time::Duration) -> Result<Report> {
    bounded(limit, "report lookup", repo.get_by_id(id))
        .await
        .map_err(review_failure)?
        .ok_or_else(|| AppError::NotFound(format!("report {id} not found")))
}

fn review_failure(err: AppError) -> AppError {
    match err {
        AppError::Timeout(_) => err,
        other => {
            warn!(%other, "review store call failed");
            AppError::ReviewUpdateFailed(other.to_string())
        }
    }
}
