//! Report intake: validate, attach the photo, and persist a pending report.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::chat::PhotoRef;
use crate::config::PhotoPolicy;
use crate::feed::StoreChange;
use crate::models::report::{Report, ReportDraft};
use crate::persistence::report_repo::ReportRepo;
use crate::persistence::task_repo::TaskRepo;
use crate::persistence::worker_repo::WorkerRepo;
use crate::state::AppState;
use crate::{AppError, Result};

use super::bounded;

/// Inputs for one `/report` submission.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Chat identity of the submitting worker.
    pub telegram_id: i64,
    /// Task identifier token from the command.
    pub task_id: String,
    /// Free text after the task identifier.
    pub note: Option<String>,
    /// Calendar date the task must be assigned for.
    pub today: NaiveDate,
    /// Attached photo, if any.
    pub photo: Option<PhotoRef>,
}

/// Run the intake pipeline and return the stored report.
///
/// Checks run in order and the first failure ends the request: registration,
/// task validity, photo policy, photo upload, then persistence.
///
/// # Errors
///
/// - `AppError::NotRegistered` when the chat identity is unknown.
/// - `AppError::UnknownOrExpiredTask` when no such task is assigned for today.
/// - `AppError::MissingAttachment` when a photo is required but absent.
/// - `AppError::AttachmentUploadFailed` when the photo cannot be fetched or uploaded.
/// - `AppError::PersistenceFailed` when the report cannot be stored.
/// - `AppError::Timeout` when an upstream call exceeds its bound.
pub async fn submit_report(state: &AppState, req: ReportRequest) -> Result<Report> {
    let limit = state.config.upstream_timeout();
    let workers = WorkerRepo::new(Arc::clone(&state.db));
    let tasks = TaskRepo::new(Arc::clone(&state.db));
    let reports = ReportRepo::new(Arc::clone(&state.db));

    let worker = bounded(limit, "worker lookup", workers.find_by_telegram_id(req.telegram_id))
        .await
        .map_err(|err| persistence_failure(err, "worker lookup"))?;
    if worker.is_none() {
        return Err(AppError::NotRegistered(format!(
            "telegram id {} has no worker record",
            req.telegram_id
        )));
    }

    let task = bounded(limit, "task lookup", tasks.find_assigned(&req.task_id, req.today))
        .await
        .map_err(|err| persistence_failure(err, "task lookup"))?;
    if task.is_none() {
        return Err(AppError::UnknownOrExpiredTask(format!(
            "{} is not assigned for {}",
            req.task_id, req.today
        )));
    }

    let photo_url = match (&req.photo, state.config.reports.photo_policy) {
        (Some(photo), _) => Some(upload_photo(state, &req, photo).await?),
        (None, PhotoPolicy::Required) => {
            return Err(AppError::MissingAttachment(format!(
                "report for {} carried no photo",
                req.task_id
            )));
        }
        (None, PhotoPolicy::Optional) => None,
    };

    let draft = ReportDraft {
        task_id: req.task_id.clone(),
        submitted_by: req.telegram_id,
        photo_url,
        note: req.note.clone(),
        submitted_at: Utc::now(),
        placeholder_reviewer: state.config.reports.placeholder_reviewer.clone(),
    };

    let report = bounded(
        limit,
        "report insert",
        reports.create(
            &state.config.reports.ids(),
            state.config.reports.insert_attempts,
            &draft,
        ),
    )
    .await
    .map_err(|err| persistence_failure(err, "report insert"))?;

    info!(
        report_id = %report.id,
        task_id = %report.task_id,
        telegram_id = report.submitted_by,
        has_photo = report.photo_url.is_some(),
        "report submitted"
    );
    state.changes.publish(StoreChange::ReportSubmitted {
        report_id: report.id.clone(),
        task_id: report.task_id.clone(),
    });

    Ok(report)
}

/// Fetch the photo through the chat transport and store it on the media host.
async fn upload_photo(state: &AppState, req: &ReportRequest, photo: &PhotoRef) -> Result<String> {
    let limit = state.config.upstream_timeout();

    let Some(chat) = state.chat.as_ref() else {
        return Err(AppError::AttachmentUploadFailed(
            "no chat transport to fetch the photo from".into(),
        ));
    };
    let Some(media) = state.media.as_ref() else {
        return Err(AppError::AttachmentUploadFailed(
            "media host is not configured".into(),
        ));
    };

    let bytes = bounded(limit, "photo download", chat.fetch_file(&photo.file_id))
        .await
        .map_err(|err| upload_failure(err, "photo download"))?;

    let file_name = format!(
        "{}_{}_{}.jpg",
        req.task_id,
        req.telegram_id,
        Utc::now().timestamp_millis()
    );
    let url = bounded(
        limit,
        "photo upload",
        media.upload(&state.config.media.folder, &file_name, bytes),
    )
    .await
    .map_err(|err| upload_failure(err, "photo upload"))?;

    Ok(url)
}

fn upload_failure(err: AppError, step: &str) -> AppError {
    match err {
        AppError::Timeout(_) => err,
        other => {
            warn!(%other, step, "attachment step failed");
            AppError::AttachmentUploadFailed(format!("{step}: {other}"))
        }
    }
}

fn persistence_failure(err: AppError, step: &str) -> AppError {
    match err {
        AppError::Timeout(_) | AppError::PersistenceFailed(_) => err,
        other => AppError::PersistenceFailed(format!("{step}: {other}")),
    }
}
