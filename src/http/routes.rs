//! Route table and handlers for the dashboard API.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use crate::models::report::{RejectionReason, Report, ReportView, ReviewDecision};
use crate::models::task::{NewTask, Task};
use crate::state::AppState;
use crate::workflow::dashboard::{self, DashboardStats};
use crate::workflow::{review, tasks};
use crate::AppError;

type Shared = State<Arc<AppState>>;

/// [`AppError`] rendered as a JSON error response.
#[derive(Debug)]
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyReviewed(_) => StatusCode::CONFLICT,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(err = %self.0, "dashboard request failed");
        } else {
            warn!(err = %self.0, "dashboard request refused");
        }
        let body = serde_json::json!({ "error": self.0.caller_message() });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
struct TaskQuery {
    date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct ReviewerQuery {
    reviewer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RejectBody {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    reviewer: Option<String>,
}

/// Build the dashboard router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/reports/pending", get(pending_reports))
        .route("/api/reports/validated", get(validated_reports))
        .route("/api/reports/{id}/approve", post(approve_report))
        .route("/api/reports/{id}/reject", post(reject_report))
        .route("/api/stats", get(stats))
        .route("/api/events", get(events))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn list_tasks(State(state): Shared, Query(q): Query<TaskQuery>) -> ApiResult<Vec<Task>> {
    Ok(Json(tasks::list_tasks(&state, q.date).await?))
}

async fn create_task(
    State(state): Shared,
    Json(input): Json<NewTask>,
) -> std::result::Result<(StatusCode, Json<Task>), ApiError> {
    let task = tasks::create_task(&state, input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn pending_reports(State(state): Shared) -> ApiResult<Vec<ReportView>> {
    Ok(Json(dashboard::list_pending(&state).await?))
}

async fn validated_reports(State(state): Shared) -> ApiResult<Vec<ReportView>> {
    Ok(Json(dashboard::list_validated(&state).await?))
}

async fn approve_report(
    State(state): Shared,
    Path(id): Path<String>,
    Query(q): Query<ReviewerQuery>,
) -> ApiResult<Report> {
    let report =
        review::review_report(&state, &id, &ReviewDecision::Approve, q.reviewer.as_deref())
            .await?;
    Ok(Json(report))
}

async fn reject_report(
    State(state): Shared,
    Path(id): Path<String>,
    Json(body): Json<RejectBody>,
) -> ApiResult<Report> {
    let decision = ReviewDecision::Reject(RejectionReason::new(&body.reason)?);
    let report = review::review_report(&state, &id, &decision, body.reviewer.as_deref()).await?;
    Ok(Json(report))
}

async fn stats(State(state): Shared) -> ApiResult<DashboardStats> {
    Ok(Json(dashboard::stats(&state).await?))
}

/// Stream of store changes. A lagging subscriber gets a `resync` event and
/// should re-fetch everything.
async fn events(State(state): Shared) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.changes.subscribe()).filter_map(|change| {
        let event = match change {
            Ok(change) => Event::default().event("change").json_data(&change).ok()?,
            Err(_) => Event::default().event("resync").data("lagged"),
        };
        Some(Ok(event))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
