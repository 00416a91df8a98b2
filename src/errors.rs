//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Persistence failure when interacting with `SQLite`.
    Db(String),
    /// Telegram Bot API failure.
    Telegram(String),
    /// Media host request failure.
    Media(String),
    /// IPC communication failure.
    Ipc(String),
    /// File-system or I/O operation failure.
    Io(String),
    /// Requested entity does not exist.
    NotFound(String),
    /// Caller-supplied input failed validation.
    Validation(String),
    /// Chat identity has no registered worker record.
    NotRegistered(String),
    /// Task does not exist or is not assigned for today.
    UnknownOrExpiredTask(String),
    /// Photo was required but the submission carried none.
    MissingAttachment(String),
    /// Photo could not be fetched from the chat transport or uploaded.
    AttachmentUploadFailed(String),
    /// Report or task could not be written to the store.
    PersistenceFailed(String),
    /// Review status change could not be written to the store.
    ReviewUpdateFailed(String),
    /// Report was already approved or rejected.
    AlreadyReviewed(String),
    /// Tasks or reports could not be read for the status projection.
    ProjectionFetchFailed(String),
    /// Upstream call did not complete within the configured bound.
    Timeout(String),
}

impl AppError {
    /// Short, user-facing text for a chat reply.
    ///
    /// Never includes the internal detail carried in the payload; that
    /// belongs in the operator log only.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotRegistered(_) => "You are not registered yet. Send /register first.",
            Self::UnknownOrExpiredTask(_) => "There is no task with that code for today.",
            Self::MissingAttachment(_) => {
                "Please attach a photo and put /report <TaskId> in its caption."
            }
            Self::AttachmentUploadFailed(_) => "Failed to upload the photo. Please try again.",
            Self::PersistenceFailed(_) => "Failed to send the report. Please try again later.",
            Self::ProjectionFetchFailed(_) => "Failed to load today's tasks. Please try again.",
            Self::Timeout(_) => "The request took too long. Please try again.",
            Self::Validation(_) => "That request is not valid.",
            _ => "Something went wrong. Please try again later.",
        }
    }

    /// Whether the failure stems from the caller's input rather than the
    /// service or an upstream.
    #[must_use]
    pub fn is_caller_fault(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Validation(_)
                | Self::NotRegistered(_)
                | Self::UnknownOrExpiredTask(_)
                | Self::MissingAttachment(_)
                | Self::AlreadyReviewed(_)
        )
    }

    /// Response text for a supervisor surface (dashboard API, IPC).
    ///
    /// Caller faults keep their detail. Internal failures collapse to a fixed
    /// message per kind; the store or upstream detail goes to the log only.
    #[must_use]
    pub fn caller_message(&self) -> String {
        if self.is_caller_fault() {
            return self.to_string();
        }
        let text = match self {
            Self::Config(_) => "service misconfigured",
            Self::Db(_) => "storage unavailable",
            Self::Telegram(_) => "chat transport unavailable",
            Self::Media(_) => "media host unavailable",
            Self::Ipc(_) => "control channel failure",
            Self::Io(_) => "i/o failure",
            Self::AttachmentUploadFailed(_) => "attachment upload failed",
            Self::PersistenceFailed(_) => "failed to save changes",
            Self::ReviewUpdateFailed(_) => "failed to update review",
            Self::ProjectionFetchFailed(_) => "failed to load tasks",
            Self::Timeout(_) => "upstream call timed out",
            _ => "internal error",
        };
        text.to_owned()
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Db(msg) => write!(f, "db: {msg}"),
            Self::Telegram(msg) => write!(f, "telegram: {msg}"),
            Self::Media(msg) => write!(f, "media: {msg}"),
            Self::Ipc(msg) => write!(f, "ipc: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
            Self::NotRegistered(msg) => write!(f, "not registered: {msg}"),
            Self::UnknownOrExpiredTask(msg) => write!(f, "unknown or expired task: {msg}"),
            Self::MissingAttachment(msg) => write!(f, "missing attachment: {msg}"),
            Self::AttachmentUploadFailed(msg) => write!(f, "attachment upload failed: {msg}"),
            Self::PersistenceFailed(msg) => write!(f, "persistence failed: {msg}"),
            Self::ReviewUpdateFailed(msg) => write!(f, "review update failed: {msg}"),
            Self::AlreadyReviewed(msg) => write!(f, "already reviewed: {msg}"),
            Self::ProjectionFetchFailed(msg) => write!(f, "projection fetch failed: {msg}"),
            Self::Timeout(msg) => write!(f, "timeout: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err.to_string())
    }
}
