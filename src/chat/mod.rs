//! Chat transport abstraction and the bot command surface.
//!
//! The [`ChatTransport`] trait decouples the report workflows from the
//! messaging platform. Workflows only ever send text and fetch attached
//! files; everything platform-specific lives in the [`telegram`] module.

pub mod commands;
pub mod handlers;
pub mod telegram;

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::Result;

/// One resolution variant of an attached photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoVariant {
    /// Transport-level file handle.
    pub file_id: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Handle to the photo variant that will be fetched and uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    /// Transport-level file handle.
    pub file_id: String,
}

impl PhotoRef {
    /// Pick the highest-resolution variant; ties go to the later entry.
    #[must_use]
    pub fn best(variants: &[PhotoVariant]) -> Option<Self> {
        variants
            .iter()
            .max_by_key(|v| u64::from(v.width) * u64::from(v.height))
            .map(|v| Self {
                file_id: v.file_id.clone(),
            })
    }
}

/// Transport-neutral view of one inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Chat identity of the sender.
    pub chat_id: i64,
    /// Username, or first name when the user has none.
    pub display_name: String,
    /// Message text, or the caption of a photo message.
    pub text: Option<String>,
    /// Attached photo, if any.
    pub photo: Option<PhotoRef>,
}

/// Outbound operations the workflows need from a chat platform.
pub trait ChatTransport: Send + Sync {
    /// Deliver a plain-text message to `chat_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Telegram`](crate::AppError::Telegram) if delivery fails.
    fn send_text(
        &self,
        chat_id: i64,
        text: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Download the bytes behind a transport file handle.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Telegram`](crate::AppError::Telegram) if the file
    /// cannot be resolved or downloaded.
    fn fetch_file(&self, file_id: &str) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>>;
}
