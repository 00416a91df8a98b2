//! Worker model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role recorded for a registered chat user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Field worker using the chat bot.
    Worker,
    /// Reviewer using the dashboard.
    Supervisor,
}

impl Role {
    /// Storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Supervisor => "supervisor",
        }
    }
}

/// A registered chat user; immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Worker {
    /// Unique record identifier.
    pub id: String,
    /// Display name taken from the chat profile at registration.
    pub name: String,
    /// Stable Telegram chat identity.
    pub telegram_id: i64,
    /// Always `Worker` for self-registered users.
    pub role: Role,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl Worker {
    /// Construct a new worker with a generated identifier.
    #[must_use]
    pub fn new(name: String, telegram_id: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            telegram_id,
            role: Role::Worker,
            created_at: Utc::now(),
        }
    }
}

/// Result of a `/register` attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// A new worker record was created.
    Created(Worker),
    /// The chat identity was already registered; nothing changed.
    AlreadyRegistered(Worker),
}

impl Registration {
    /// The worker record, new or existing.
    #[must_use]
    pub fn worker(&self) -> &Worker {
        match self {
            Self::Created(w) | Self::AlreadyRegistered(w) => w,
        }
    }
}
