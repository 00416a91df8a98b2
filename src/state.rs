//! Shared application state handed to every request handler.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::chat::ChatTransport;
use crate::config::GlobalConfig;
use crate::feed::ChangeFeed;
use crate::media::MediaHost;

/// Shared application state accessible by chat, HTTP and IPC handlers.
///
/// Holds no per-request data; every workflow receives its own request
/// context and re-reads the store.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// `SQLite` connection pool.
    pub db: Arc<SqlitePool>,
    /// Chat transport (absent when the bot is disabled).
    pub chat: Option<Arc<dyn ChatTransport>>,
    /// Media host for report photos (absent when not configured).
    pub media: Option<Arc<dyn MediaHost>>,
    /// Live change feed for dashboard subscribers.
    pub changes: ChangeFeed,
}

impl AppState {
    /// Current calendar date in the configured local offset.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now()
            .with_timezone(&self.config.local_offset())
            .date_naive()
    }
}
