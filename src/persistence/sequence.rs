//! Store-side support for sequential identifiers.
//!
//! The next identifier is computed from the greatest one currently stored;
//! the primary key rejects a concurrent duplicate and callers retry with a
//! freshly computed value.

use sqlx::SqlitePool;

use crate::Result;

/// Tables that carry sequential identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencedTable {
    /// `tasks`
    Tasks,
    /// `task_reports`
    Reports,
}

impl SequencedTable {
    fn name(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Reports => "task_reports",
        }
    }
}

/// Numerically greatest identifier with `prefix` in `table`.
///
/// Orders by length before text so that `SUB1000` ranks above `SUB999`.
///
/// # Errors
///
/// Returns `AppError::Db` if the query fails.
pub async fn last_id(db: &SqlitePool, table: SequencedTable, prefix: &str) -> Result<Option<String>> {
    // `table.name()` only yields compile-time literals.
    let query = format!(
        "SELECT id FROM {} \
         WHERE substr(id, 1, ?2) = ?1 AND length(id) > ?2 \
           AND substr(id, ?2 + 1) NOT GLOB '*[^0-9]*' \
         ORDER BY length(id) DESC, id DESC LIMIT 1",
        table.name()
    );
    let prefix_len = i64::try_from(prefix.len()).unwrap_or(i64::MAX);
    let row: Option<(String,)> = sqlx::query_as(&query)
        .bind(prefix)
        .bind(prefix_len)
        .fetch_optional(db)
        .await?;
    Ok(row.map(|(id,)| id))
}

/// Whether an insert failed because the primary key already exists.
#[must_use]
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
