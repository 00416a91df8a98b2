//! Task report model and review state machine.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// Flat review status as stored in the `status` column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Awaiting supervisor review.
    Pending,
    /// Supervisor accepted the report.
    Approved,
    /// Supervisor rejected the report.
    Rejected,
}

impl ReportStatus {
    /// Storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse the storage representation.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` for an unknown status string.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(AppError::Db(format!("invalid report status: {other}"))),
        }
    }
}

impl Display for ReportStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review lifecycle of a report. Only `Pending` accepts a transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReviewState {
    /// Awaiting supervisor review.
    Pending,
    /// Accepted by `reviewer` at `reviewed_at`.
    Approved {
        /// Review timestamp.
        reviewed_at: DateTime<Utc>,
        /// Reviewer identity.
        reviewer: String,
    },
    /// Refused by `reviewer` at `reviewed_at` for `reason`.
    Rejected {
        /// Review timestamp.
        reviewed_at: DateTime<Utc>,
        /// Reviewer identity.
        reviewer: String,
        /// Mandatory rejection reason.
        reason: String,
    },
}

/// Outcome of applying a decision to a review state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The state moved out of `Pending`.
    Applied(ReviewState),
    /// The report already carries this decision; nothing to write.
    Unchanged,
}

impl ReviewState {
    /// Flat status of this state.
    #[must_use]
    pub fn status(&self) -> ReportStatus {
        match self {
            Self::Pending => ReportStatus::Pending,
            Self::Approved { .. } => ReportStatus::Approved,
            Self::Rejected { .. } => ReportStatus::Rejected,
        }
    }

    /// Review timestamp, if reviewed.
    #[must_use]
    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Pending => None,
            Self::Approved { reviewed_at, .. } | Self::Rejected { reviewed_at, .. } => {
                Some(*reviewed_at)
            }
        }
    }

    /// Apply `decision` to this state.
    ///
    /// A repeated identical decision is `Unchanged` so that retries are
    /// harmless.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AlreadyReviewed` when a reviewed report is asked to
    /// take the opposite decision.
    pub fn transition(
        &self,
        decision: &ReviewDecision,
        reviewer: &str,
        at: DateTime<Utc>,
    ) -> Result<Transition> {
        match self {
            Self::Pending => Ok(Transition::Applied(decision.to_state(reviewer, at))),
            reviewed if reviewed.status() == decision.target_status() => Ok(Transition::Unchanged),
            reviewed => Err(AppError::AlreadyReviewed(format!(
                "report is already {}",
                reviewed.status()
            ))),
        }
    }
}

/// Non-blank rejection reason, validated at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionReason(String);

impl RejectionReason {
    /// Validate and wrap a rejection reason.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `reason` is empty or whitespace.
    pub fn new(reason: &str) -> Result<Self> {
        let trimmed = reason.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("rejection reason is required".into()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The reason text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Supervisor decision on a pending report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Accept the report.
    Approve,
    /// Refuse the report with a reason.
    Reject(RejectionReason),
}

impl ReviewDecision {
    /// Status the report will carry after this decision.
    #[must_use]
    pub fn target_status(&self) -> ReportStatus {
        match self {
            Self::Approve => ReportStatus::Approved,
            Self::Reject(_) => ReportStatus::Rejected,
        }
    }

    fn to_state(&self, reviewer: &str, at: DateTime<Utc>) -> ReviewState {
        match self {
            Self::Approve => ReviewState::Approved {
                reviewed_at: at,
                reviewer: reviewer.to_owned(),
            },
            Self::Reject(reason) => ReviewState::Rejected {
                reviewed_at: at,
                reviewer: reviewer.to_owned(),
                reason: reason.as_str().to_owned(),
            },
        }
    }
}

/// A worker's completion report for a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    /// `SUB`-prefixed sequential identifier.
    pub id: String,
    /// Task this report is for.
    pub task_id: String,
    /// Telegram identity of the submitting worker.
    pub submitted_by: i64,
    /// Uploaded photo URL, if any.
    pub photo_url: Option<String>,
    /// Free-text note from the worker.
    pub note: Option<String>,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
    /// Review lifecycle.
    #[serde(flatten)]
    pub review: ReviewState,
    /// Whether the worker has been told about the review outcome.
    pub notified: bool,
}

impl Report {
    /// Assemble a pending report from a draft and its assigned identifier.
    #[must_use]
    pub fn from_draft(id: String, draft: &ReportDraft) -> Self {
        Self {
            id,
            task_id: draft.task_id.clone(),
            submitted_by: draft.submitted_by,
            photo_url: draft.photo_url.clone(),
            note: draft.note.clone(),
            submitted_at: draft.submitted_at,
            review: ReviewState::Pending,
            notified: false,
        }
    }

    /// Flat review status.
    #[must_use]
    pub fn status(&self) -> ReportStatus {
        self.review.status()
    }
}

/// Everything needed to insert a report except its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    /// Task this report is for.
    pub task_id: String,
    /// Telegram identity of the submitting worker.
    pub submitted_by: i64,
    /// Uploaded photo URL, if any.
    pub photo_url: Option<String>,
    /// Free-text note from the worker.
    pub note: Option<String>,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
    /// Placeholder reviewer stored until a supervisor acts.
    pub placeholder_reviewer: String,
}

/// Report joined with its task title and worker name for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportView {
    /// The report itself.
    #[serde(flatten)]
    pub report: Report,
    /// Title of the referenced task, if it still resolves.
    pub task_title: Option<String>,
    /// Name of the submitting worker, if registered.
    pub worker_name: Option<String>,
}
