//! Worker self-registration.

use std::sync::Arc;

use tracing::info;

use crate::models::worker::{Registration, Worker};
use crate::persistence::worker_repo::WorkerRepo;
use crate::state::AppState;
use crate::Result;

use super::bounded;

/// Register the chat identity as a worker, or return the existing record.
///
/// # Errors
///
/// Returns `AppError::Db` or `AppError::Timeout` if the store call fails.
pub async fn register_worker(
    state: &AppState,
    telegram_id: i64,
    display_name: &str,
) -> Result<Registration> {
    let repo = WorkerRepo::new(Arc::clone(&state.db));
    let worker = Worker::new(display_name.to_owned(), telegram_id);

    let outcome = bounded(
        state.config.upstream_timeout(),
        "worker registration",
        repo.register(&worker),
    )
    .await?;

    if let Registration::Created(ref w) = outcome {
        info!(telegram_id, worker_id = %w.id, "worker registered");
    }
    Ok(outcome)
}
