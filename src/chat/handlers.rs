//! Chat command dispatch.
//!
//! Turns one inbound message into at most one reply. Failures are logged
//! with their detail and answered with the error's short user message.

use tracing::{error, info_span, warn, Instrument};

use crate::models::worker::Registration;
use crate::state::AppState;
use crate::workflow::intake::{self, ReportRequest};
use crate::workflow::{projection, registration};
use crate::AppError;

use super::commands::{self, BotCommand, COMMAND_LIST};
use super::InboundMessage;

const REPORT_USAGE: &str = "Usage: /report <TaskId> [note]";

/// Handle one inbound message and return the reply, if any.
///
/// Messages that are not a known command get no reply.
pub async fn handle_message(state: &AppState, msg: InboundMessage) -> Option<String> {
    let command = commands::parse(msg.text.as_deref()?)?;
    let span = info_span!("chat_command", chat_id = msg.chat_id, ?command);

    async move {
        let reply = match command {
            BotCommand::Help => Ok(COMMAND_LIST.to_owned()),
            BotCommand::ReportUsage => Ok(REPORT_USAGE.to_owned()),
            BotCommand::Register => {
                registration::register_worker(state, msg.chat_id, &msg.display_name)
                    .await
                    .map(|outcome| match outcome {
                        Registration::Created(w) => {
                            format!("Registration successful! Welcome, {}.", w.name)
                        }
                        Registration::AlreadyRegistered(w) => {
                            format!("You are already registered as {}.", w.name)
                        }
                    })
            }
            BotCommand::Tasks => projection::task_status(state, msg.chat_id, state.today())
                .await
                .map(|lines| projection::render(&lines)),
            BotCommand::Report { task_id, note } => {
                let req = ReportRequest {
                    telegram_id: msg.chat_id,
                    task_id,
                    note,
                    today: state.today(),
                    photo: msg.photo,
                };
                intake::submit_report(state, req).await.map(|report| {
                    format!(
                        "Report {} for {} has been sent and is awaiting review.\nUse /task to check your progress.",
                        report.id, report.task_id
                    )
                })
            }
        };

        Some(reply.unwrap_or_else(|err| failure_reply(&err)))
    }
    .instrument(span)
    .await
}

fn failure_reply(err: &AppError) -> String {
    match err {
        AppError::NotRegistered(_)
        | AppError::UnknownOrExpiredTask(_)
        | AppError::MissingAttachment(_) => warn!(%err, "chat command refused"),
        _ => error!(%err, "chat command failed"),
    }
    err.user_message().to_owned()
}
