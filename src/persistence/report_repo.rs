//! Task report repository for `SQLite` persistence.

use std::sync::Arc;

use tracing::warn;

use crate::models::ident::IdScheme;
use crate::models::report::{Report, ReportDraft, ReportStatus, ReportView, ReviewState};
use crate::{AppError, Result};

use super::db::Database;
use super::sequence::{self, SequencedTable};
use super::{parse_timestamp, timestamp_str};

/// Repository wrapper around `SQLite` for task report records.
#[derive(Clone)]
pub struct ReportRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct ReportRow {
    id: String,
    task_id: String,
    submitted_by: i64,
    photo_url: Option<String>,
    status: String,
    keterangan: Option<String>,
    submitted_at: String,
    reviewed_at: Option<String>,
    reviewed_by: String,
    review_notes: Option<String>,
    notified: bool,
}

/// Report row joined with display columns.
#[derive(sqlx::FromRow)]
struct ReportViewRow {
    #[sqlx(flatten)]
    report: ReportRow,
    task_title: Option<String>,
    worker_name: Option<String>,
}

impl ReportRow {
    /// Convert a database row into the domain model.
    fn into_report(self) -> Result<Report> {
        let submitted_at = parse_timestamp("submitted_at", &self.submitted_at)?;
        let reviewed_at = self
            .reviewed_at
            .as_deref()
            .map(|s| parse_timestamp("reviewed_at", s))
            .transpose()?;

        let review = match (ReportStatus::parse(&self.status)?, reviewed_at) {
            (ReportStatus::Pending, _) => ReviewState::Pending,
            (ReportStatus::Approved, Some(reviewed_at)) => ReviewState::Approved {
                reviewed_at,
                reviewer: self.reviewed_by,
            },
            (ReportStatus::Rejected, Some(reviewed_at)) => ReviewState::Rejected {
                reviewed_at,
                reviewer: self.reviewed_by,
                reason: self.review_notes.unwrap_or_default(),
            },
            (status, None) => {
                return Err(AppError::Db(format!(
                    "report {} is {status} without reviewed_at",
                    self.id
                )));
            }
        };

        Ok(Report {
            id: self.id,
            task_id: self.task_id,
            submitted_by: self.submitted_by,
            photo_url: self.photo_url,
            note: self.keterangan,
            submitted_at,
            review,
            notified: self.notified,
        })
    }
}

impl ReportViewRow {
    fn into_view(self) -> Result<ReportView> {
        Ok(ReportView {
            report: self.report.into_report()?,
            task_title: self.task_title,
            worker_name: self.worker_name,
        })
    }
}

const VIEW_SELECT: &str = "SELECT r.*, t.title AS task_title, u.name AS worker_name
     FROM task_reports r
     LEFT JOIN tasks t ON t.id = r.task_id
     LEFT JOIN users u ON u.telegram_id = r.submitted_by";

impl ReportRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a pending report under the next free identifier of `ids`.
    ///
    /// A primary-key collision with a concurrent writer triggers a retry
    /// with a recomputed identifier, up to `attempts` inserts in total.
    ///
    /// # Errors
    ///
    /// Returns `AppError::PersistenceFailed` when every attempt collides,
    /// or `AppError::Db` for any other store failure.
    pub async fn create(
        &self,
        ids: &IdScheme,
        attempts: u32,
        draft: &ReportDraft,
    ) -> Result<Report> {
        for attempt in 1..=attempts {
            let last = sequence::last_id(&self.db, SequencedTable::Reports, &ids.prefix).await?;
            let report = Report::from_draft(ids.next_after(last.as_deref())?, draft);

            match self.insert(&report, &draft.placeholder_reviewer).await {
                Ok(()) => return Ok(report),
                Err(err) if sequence::is_unique_violation(&err) => {
                    warn!(report_id = %report.id, attempt, "report id collision, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AppError::PersistenceFailed(format!(
            "no free report id after {attempts} attempts"
        )))
    }

    async fn insert(&self, report: &Report, reviewer: &str) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO task_reports (id, task_id, submitted_by, photo_url, status, keterangan,
             submitted_at, reviewed_at, reviewed_by, review_notes, notified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, NULL, 0)",
        )
        .bind(&report.id)
        .bind(&report.task_id)
        .bind(report.submitted_by)
        .bind(&report.photo_url)
        .bind(report.status().as_str())
        .bind(&report.note)
        .bind(timestamp_str(report.submitted_at))
        .bind(reviewer)
        .execute(self.db.as_ref())
        .await?;
        Ok(())
    }

    /// Retrieve a report by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Report>> {
        let row: Option<ReportRow> = sqlx::query_as("SELECT * FROM task_reports WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;

        row.map(ReportRow::into_report).transpose()
    }

    /// Every report a worker has submitted, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_by_submitter(&self, telegram_id: i64) -> Result<Vec<Report>> {
        let rows: Vec<ReportRow> = sqlx::query_as(
            "SELECT * FROM task_reports WHERE submitted_by = ?1
             ORDER BY submitted_at DESC, length(id) DESC, id DESC",
        )
        .bind(telegram_id)
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(ReportRow::into_report).collect()
    }

    /// Move a pending report into `review`.
    ///
    /// The `status = 'pending'` guard makes the transition atomic; returns
    /// `false` when no pending report with `id` exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn apply_review(&self, id: &str, review: &ReviewState) -> Result<bool> {
        let (reviewed_at, reviewer, notes) = match review {
            ReviewState::Pending => {
                return Err(AppError::Validation("cannot review into pending".into()));
            }
            ReviewState::Approved {
                reviewed_at,
                reviewer,
            } => (*reviewed_at, reviewer.as_str(), None),
            ReviewState::Rejected {
                reviewed_at,
                reviewer,
                reason,
            } => (*reviewed_at, reviewer.as_str(), Some(reason.as_str())),
        };

        let updated = sqlx::query(
            "UPDATE task_reports
             SET status = ?1, reviewed_at = ?2, reviewed_by = ?3, review_notes = ?4
             WHERE id = ?5 AND status = 'pending'",
        )
        .bind(review.status().as_str())
        .bind(timestamp_str(reviewed_at))
        .bind(reviewer)
        .bind(notes)
        .bind(id)
        .execute(self.db.as_ref())
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    /// Pending reports with task title and worker name, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_pending_views(&self) -> Result<Vec<ReportView>> {
        let query = format!(
            "{VIEW_SELECT} WHERE r.status = 'pending' \
             ORDER BY r.submitted_at ASC, length(r.id), r.id"
        );
        let rows: Vec<ReportViewRow> = sqlx::query_as(&query)
            .fetch_all(self.db.as_ref())
            .await?;

        rows.into_iter().map(ReportViewRow::into_view).collect()
    }

    /// Approved and rejected reports with display columns, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_validated_views(&self) -> Result<Vec<ReportView>> {
        let query = format!(
            "{VIEW_SELECT} WHERE r.status IN ('approved', 'rejected') \
             ORDER BY r.submitted_at ASC, length(r.id), r.id"
        );
        let rows: Vec<ReportViewRow> = sqlx::query_as(&query)
            .fetch_all(self.db.as_ref())
            .await?;

        rows.into_iter().map(ReportViewRow::into_view).collect()
    }

    /// Reviewed reports whose worker has not been told the outcome yet.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_unnotified_reviews(&self) -> Result<Vec<Report>> {
        let rows: Vec<ReportRow> = sqlx::query_as(
            "SELECT * FROM task_reports
             WHERE status IN ('approved', 'rejected') AND notified = 0
             ORDER BY reviewed_at ASC",
        )
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(ReportRow::into_report).collect()
    }

    /// Record that the worker was told about the review outcome.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn mark_notified(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE task_reports SET notified = 1 WHERE id = ?1")
            .bind(id)
            .execute(self.db.as_ref())
            .await?;
        Ok(())
    }

    /// Report counts per status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn count_by_status(&self) -> Result<Vec<(ReportStatus, i64)>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM task_reports GROUP BY status")
                .fetch_all(self.db.as_ref())
                .await?;

        rows.into_iter()
            .map(|(status, n)| Ok((ReportStatus::parse(&status)?, n)))
            .collect()
    }
}
