//! Local IPC server for `jobdesk-ctl` commands.
//!
//! Listens on a named pipe (Windows) or Unix domain socket (Linux/macOS)
//! using the `interprocess` crate. Accepts line-delimited JSON commands
//! from `jobdesk-ctl` and routes them to the review and task workflows.
//!
//! ## Protocol
//!
//! Request (one JSON object per line):
//! ```json
//! {"command": "pending"}
//! {"command": "approve", "id": "SUB001"}
//! {"command": "reject", "id": "SUB001", "reason": "photo is blurry"}
//! {"command": "create_task", "title": "Fix pump", "date": "2024-05-01"}
//! {"command": "tasks", "date": "2024-05-01"}
//! ```
//!
//! Response (one JSON object per line):
//! ```json
//! {"ok": true, "data": { ... } }
//! {"ok": false, "error": "not found: report SUB009 not found"}
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use interprocess::local_socket::{tokio::prelude::*, GenericNamespaced, ListenerOptions};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

use crate::models::report::{RejectionReason, ReviewDecision};
use crate::models::task::NewTask;
use crate::state::AppState;
use crate::workflow::{dashboard, review, tasks};
use crate::{AppError, Result};

/// Inbound IPC request from `jobdesk-ctl`.
#[derive(Debug, Default, Deserialize)]
pub struct IpcRequest {
    /// Command verb.
    pub command: String,
    /// Report identifier (for `approve`, `reject`).
    #[serde(default)]
    pub id: Option<String>,
    /// Rejection reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Reviewer or task creator name.
    #[serde(default)]
    pub reviewer: Option<String>,
    /// Task title (for `create_task`).
    #[serde(default)]
    pub title: Option<String>,
    /// Task description (for `create_task`).
    #[serde(default)]
    pub description: Option<String>,
    /// Assignment date (for `create_task`, `tasks`).
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Shared-secret authentication token.
    #[serde(default)]
    pub auth_token: Option<String>,
}

/// Outbound IPC response to `jobdesk-ctl`.
#[derive(Debug, Serialize)]
pub struct IpcResponse {
    /// Whether the command succeeded.
    pub ok: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IpcResponse {
    fn success(data: serde_json::Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }

    fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result.and_then(|value| {
            serde_json::to_value(value)
                .map_err(|err| AppError::Ipc(format!("serialization failed: {err}")))
        }) {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(&err),
        }
    }

    fn failure(err: &AppError) -> Self {
        if err.is_caller_fault() {
            warn!(%err, "ipc command refused");
        } else {
            error!(%err, "ipc command failed");
        }
        Self::error(err.caller_message())
    }
}

/// Spawn the IPC server task.
///
/// # Errors
///
/// Returns `AppError::Ipc` if the listener cannot be created.
pub fn spawn_ipc_server(
    state: Arc<AppState>,
    ct: CancellationToken,
) -> Result<tokio::task::JoinHandle<()>> {
    let name = state.config.ipc_name.clone();

    let listener_name = name
        .clone()
        .to_ns_name::<GenericNamespaced>()
        .map_err(|err| AppError::Ipc(format!("invalid ipc socket name '{name}': {err}")))?;

    let listener = ListenerOptions::new()
        .name(listener_name)
        .create_tokio()
        .map_err(|err| AppError::Ipc(format!("failed to create ipc listener: {err}")))?;

    info!(ipc_name = %name, "IPC server listening");

    let handle = tokio::spawn(async move {
        let span = info_span!("ipc_server", name = %name);
        async move {
            loop {
                tokio::select! {
                    () = ct.cancelled() => {
                        info!("IPC server shutting down");
                        break;
                    }
                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok(stream) => {
                                let state = Arc::clone(&state);
                                tokio::spawn(handle_connection(stream, state));
                            }
                            Err(err) => {
                                warn!(%err, "IPC accept failed");
                            }
                        }
                    }
                }
            }
        }
        .instrument(span)
        .await;
    });

    Ok(handle)
}

/// Handle a single IPC client connection.
async fn handle_connection(
    stream: interprocess::local_socket::tokio::Stream,
    state: Arc<AppState>,
) {
    let span = info_span!("ipc_conn");
    async move {
        let (reader, mut writer) = stream.split();
        let mut buf_reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();
            match buf_reader.read_line(&mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let response = match serde_json::from_str::<IpcRequest>(trimmed) {
                        Ok(request) => dispatch_command(&request, &state).await,
                        Err(err) => IpcResponse::error(format!("invalid json: {err}")),
                    };

                    let mut response_line = serde_json::to_string(&response).unwrap_or_else(|_| {
                        r#"{"ok":false,"error":"serialization failed"}"#.to_owned()
                    });
                    response_line.push('\n');

                    if let Err(err) = writer.write_all(response_line.as_bytes()).await {
                        warn!(%err, "failed to write ipc response");
                        break;
                    }
                }
                Err(err) => {
                    warn!(%err, "ipc read error");
                    break;
                }
            }
        }

        info!("IPC connection closed");
    }
    .instrument(span)
    .await;
}

/// Route an IPC command to the matching workflow.
pub async fn dispatch_command(request: &IpcRequest, state: &AppState) -> IpcResponse {
    let span = info_span!("ipc_command", command = %request.command);

    async move {
        if let Some(ref expected) = state.config.ipc_auth_token {
            match request.auth_token {
                Some(ref provided) if provided == expected => {}
                _ => {
                    warn!("IPC request rejected: invalid auth token");
                    return IpcResponse::error("unauthorized");
                }
            }
        }

        match request.command.as_str() {
            "pending" => IpcResponse::from_result(dashboard::list_pending(state).await),
            "validated" => IpcResponse::from_result(dashboard::list_validated(state).await),
            "stats" => IpcResponse::from_result(dashboard::stats(state).await),
            "tasks" => IpcResponse::from_result(tasks::list_tasks(state, request.date).await),
            "approve" => handle_review(request, state, false).await,
            "reject" => handle_review(request, state, true).await,
            "create_task" => handle_create_task(request, state).await,
            other => IpcResponse::error(format!("unknown command: {other}")),
        }
    }
    .instrument(span)
    .await
}

async fn handle_review(request: &IpcRequest, state: &AppState, reject: bool) -> IpcResponse {
    let Some(ref id) = request.id else {
        return IpcResponse::error("missing required 'id' field");
    };

    let decision = if reject {
        match RejectionReason::new(request.reason.as_deref().unwrap_or_default()) {
            Ok(reason) => ReviewDecision::Reject(reason),
            Err(err) => return IpcResponse::error(err.to_string()),
        }
    } else {
        ReviewDecision::Approve
    };

    let result = review::review_report(state, id, &decision, request.reviewer.as_deref()).await;
    if result.is_ok() {
        info!(report_id = %id, status = %decision.target_status(), "reviewed via IPC");
    }
    IpcResponse::from_result(result)
}

async fn handle_create_task(request: &IpcRequest, state: &AppState) -> IpcResponse {
    let Some(ref title) = request.title else {
        return IpcResponse::error("missing required 'title' field");
    };

    let input = NewTask {
        title: title.clone(),
        description: request.description.clone(),
        assigned_date: request.date,
        created_by: request.reviewer.clone(),
    };
    IpcResponse::from_result(tasks::create_task(state, input).await)
}
