//! Request workflows shared by the chat bot, the HTTP API and the IPC server.
//!
//! Each workflow takes the shared [`AppState`](crate::state::AppState) plus a
//! request-scoped input and returns a typed result. No workflow holds state
//! between requests.

pub mod dashboard;
pub mod intake;
pub mod notify;
pub mod projection;
pub mod registration;
pub mod review;
pub mod tasks;

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::{AppError, Result};

/// Run `fut` with an upper bound of `limit`.
///
/// # Errors
///
/// Returns `AppError::Timeout` naming `what` when the bound elapses, or the
/// future's own error.
pub async fn bounded<T, F>(limit: Duration, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| AppError::Timeout(format!("{what} exceeded {}s", limit.as_secs())))?
}

/// Calendar date of `at` in the local offset.
#[must_use]
pub fn local_date(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}
