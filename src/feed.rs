//! In-process change feed for dashboard live updates.
//!
//! Every committed write publishes a [`StoreChange`]. Subscribers treat a
//! change as a signal to re-fetch; the payload only identifies what moved.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::report::ReportStatus;

const FEED_CAPACITY: usize = 128;

/// A committed write to the store.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreChange {
    /// A supervisor created a task.
    TaskCreated {
        /// New task identifier.
        task_id: String,
    },
    /// A worker submitted a report.
    ReportSubmitted {
        /// New report identifier.
        report_id: String,
        /// Task the report is for.
        task_id: String,
    },
    /// A supervisor reviewed a report.
    ReportReviewed {
        /// Reviewed report identifier.
        report_id: String,
        /// Status after review.
        status: ReportStatus,
    },
}

/// Broadcast sender shared by all writers.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<StoreChange>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }
}

impl ChangeFeed {
    /// Publish a change; having no subscribers is not an error.
    pub fn publish(&self, change: StoreChange) {
        if self.tx.send(change).is_err() {
            debug!("change published with no subscribers");
        }
    }

    /// Subscribe to changes published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.tx.subscribe()
    }
}
