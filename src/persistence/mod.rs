//! Persistence layer modules.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::{AppError, Result};

pub mod db;
pub mod report_repo;
pub mod schema;
pub mod sequence;
pub mod task_repo;
pub mod worker_repo;

/// Re-export the database pool type for convenience.
pub use sqlx::SqlitePool;

/// Fixed-width RFC 3339 rendering so stored timestamps sort lexically.
pub(crate) fn timestamp_str(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Db(format!("invalid {column}: {e}")))
}

pub(crate) fn date_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_date(column: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| AppError::Db(format!("invalid {column}: {e}")))
}
