//! Telegram transport built on `teloxide`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::FileId;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::handlers::handle_message;
use super::{ChatTransport, InboundMessage, PhotoRef, PhotoVariant};
use crate::state::AppState;
use crate::{AppError, Result};

/// [`ChatTransport`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Wrap an authenticated bot client.
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

impl ChatTransport for TelegramTransport {
    fn send_text(
        &self,
        chat_id: i64,
        text: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let text = text.to_owned();
        Box::pin(async move {
            self.bot
                .send_message(ChatId(chat_id), text)
                .await
                .map_err(|err| AppError::Telegram(format!("send_message failed: {err}")))?;
            Ok(())
        })
    }

    fn fetch_file(&self, file_id: &str) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
        let file_id = FileId(file_id.to_owned());
        Box::pin(async move {
            let file = self
                .bot
                .get_file(file_id)
                .await
                .map_err(|err| AppError::Telegram(format!("get_file failed: {err}")))?;

            let mut buf = Vec::new();
            self.bot
                .download_file(&file.path, &mut buf)
                .await
                .map_err(|err| AppError::Telegram(format!("download failed: {err}")))?;
            Ok(Bytes::from(buf))
        })
    }
}

/// Convert a Telegram message into the transport-neutral form.
#[must_use]
pub fn to_inbound(msg: &Message) -> InboundMessage {
    let display_name = msg
        .from
        .as_ref()
        .map(|u| u.username.clone().unwrap_or_else(|| u.first_name.clone()))
        .unwrap_or_default();

    let photo = msg.photo().and_then(|sizes| {
        let variants: Vec<PhotoVariant> = sizes
            .iter()
            .map(|p| PhotoVariant {
                file_id: p.file.id.0.clone(),
                width: p.width,
                height: p.height,
            })
            .collect();
        PhotoRef::best(&variants)
    });

    InboundMessage {
        chat_id: msg.chat.id.0,
        display_name,
        text: msg.text().or_else(|| msg.caption()).map(str::to_owned),
        photo,
    }
}

/// Register the command menu and run the bot until `cancel` fires.
#[must_use]
pub fn spawn_bot(state: Arc<AppState>, bot: Bot, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let menu = vec![
            teloxide::types::BotCommand::new("start", "Start the bot"),
            teloxide::types::BotCommand::new("register", "Register as a worker"),
            teloxide::types::BotCommand::new("task", "Show today's tasks"),
            teloxide::types::BotCommand::new("report", "Report a finished task: /report <TaskId>"),
            teloxide::types::BotCommand::new("help", "Show the command list"),
        ];
        if let Err(err) = bot.set_my_commands(menu).await {
            warn!(%err, "failed to set telegram bot commands");
        }

        info!("telegram bot started");
        let repl = teloxide::repl(bot, move |bot: Bot, msg: Message| {
            let state = Arc::clone(&state);
            async move {
                let inbound = to_inbound(&msg);
                if let Some(reply) = handle_message(&state, inbound).await {
                    if let Err(err) = bot.send_message(msg.chat.id, reply).await {
                        error!(chat_id = msg.chat.id.0, %err, "failed to send reply");
                    }
                }
                Ok(())
            }
        });

        tokio::select! {
            () = cancel.cancelled() => info!("telegram bot shutting down"),
            () = repl => info!("telegram bot stopped"),
        }
    })
}
