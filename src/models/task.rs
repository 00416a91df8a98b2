//! Task model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A unit of assigned work tied to one calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// `TASK`-prefixed sequential identifier.
    pub id: String,
    /// Short title shown to workers.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Day the task is assigned for.
    pub assigned_date: NaiveDate,
    /// Supervisor who created the task.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Supervisor input for a new task; the identifier is assigned on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTask {
    /// Short title shown to workers.
    pub title: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Day the task is assigned for; defaults to today when omitted.
    #[serde(default)]
    pub assigned_date: Option<NaiveDate>,
    /// Creator name; defaults to the placeholder reviewer when omitted.
    #[serde(default)]
    pub created_by: Option<String>,
}

/// Fully resolved task fields awaiting an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Short title shown to workers.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Day the task is assigned for.
    pub assigned_date: NaiveDate,
    /// Supervisor who created the task.
    pub created_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Assemble a task from a draft and its assigned identifier.
    #[must_use]
    pub fn from_draft(id: String, draft: &TaskDraft) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            assigned_date: draft.assigned_date,
            created_by: draft.created_by.clone(),
            created_at: draft.created_at,
        }
    }
}
