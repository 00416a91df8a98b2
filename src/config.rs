//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::models::ident::IdScheme;
use crate::{AppError, Result};

/// Keychain service name used for all runtime credentials.
pub const KEYRING_SERVICE: &str = "jobdesk";

/// Whether a `/report` submission must carry a photo.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhotoPolicy {
    /// Text-only reports are accepted; a photo is uploaded when present.
    #[default]
    Optional,
    /// A report without a readable photo fails with `MissingAttachment`.
    Required,
}

/// Report intake settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReportConfig {
    /// Report identifier prefix.
    #[serde(default = "default_report_prefix")]
    pub id_prefix: String,
    /// Minimum digits in a report identifier.
    #[serde(default = "default_id_width")]
    pub id_width: usize,
    /// Photo requirement for submissions.
    #[serde(default)]
    pub photo_policy: PhotoPolicy,
    /// Reviewer identity stamped on new reports and on reviews that name no reviewer.
    #[serde(default = "default_placeholder_reviewer")]
    pub placeholder_reviewer: String,
    /// Insert attempts before an identifier collision becomes a failure.
    #[serde(default = "default_insert_attempts")]
    pub insert_attempts: u32,
}

impl ReportConfig {
    /// Identifier scheme for reports.
    #[must_use]
    pub fn ids(&self) -> IdScheme {
        IdScheme::new(&self.id_prefix, self.id_width)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_report_prefix(),
            id_width: default_id_width(),
            photo_policy: PhotoPolicy::Optional,
            placeholder_reviewer: default_placeholder_reviewer(),
            insert_attempts: default_insert_attempts(),
        }
    }
}

/// Task registry settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TaskConfig {
    /// Task identifier prefix.
    #[serde(default = "default_task_prefix")]
    pub id_prefix: String,
    /// Minimum digits in a task identifier.
    #[serde(default = "default_id_width")]
    pub id_width: usize,
}

impl TaskConfig {
    /// Identifier scheme for tasks.
    #[must_use]
    pub fn ids(&self) -> IdScheme {
        IdScheme::new(&self.id_prefix, self.id_width)
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_task_prefix(),
            id_width: default_id_width(),
        }
    }
}

/// Telegram bot settings.
///
/// The bot token is loaded at runtime via OS keychain or environment
/// variable, never from the TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TelegramConfig {
    /// Whether the bot loop should be started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Bot token (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bot_token: String::new(),
        }
    }
}

/// Media host settings for photo uploads.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct MediaConfig {
    /// Signed-upload endpoint; empty disables photo uploads.
    #[serde(default)]
    pub upload_url: String,
    /// Logical folder all report photos are stored under.
    #[serde(default = "default_media_folder")]
    pub folder: String,
    /// API key (populated at runtime).
    #[serde(skip)]
    pub api_key: String,
    /// API secret used to sign uploads (populated at runtime).
    #[serde(skip)]
    pub api_secret: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            upload_url: String::new(),
            folder: default_media_folder(),
            api_key: String::new(),
            api_secret: String::new(),
        }
    }
}

impl MediaConfig {
    /// Whether enough is configured to attempt an upload.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.upload_url.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

/// Configurable timeout and interval values (seconds).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TimeoutConfig {
    /// Bound on every upstream call (store, chat transport, media host).
    #[serde(default = "default_upstream_seconds")]
    pub upstream_seconds: u64,
    /// Interval between review-notification sweeps.
    #[serde(default = "default_notify_interval_seconds")]
    pub notify_interval_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            upstream_seconds: default_upstream_seconds(),
            notify_interval_seconds: default_notify_interval_seconds(),
        }
    }
}

fn default_report_prefix() -> String {
    "SUB".into()
}

fn default_task_prefix() -> String {
    "TASK".into()
}

fn default_id_width() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_placeholder_reviewer() -> String {
    "supervisor".into()
}

fn default_insert_attempts() -> u32 {
    5
}

fn default_media_folder() -> String {
    "task-reports".into()
}

fn default_upstream_seconds() -> u64 {
    30
}

fn default_notify_interval_seconds() -> u64 {
    30
}

fn default_http_port() -> u16 {
    5000
}

fn default_ipc_name() -> String {
    "jobdesk".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data").join("jobdesk.db")
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// `SQLite` database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// HTTP port for the dashboard API.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Named pipe / Unix socket identifier for `jobdesk-ctl`.
    #[serde(default = "default_ipc_name")]
    pub ipc_name: String,
    /// Offset from UTC of the calendar that decides what "today" is.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Report intake settings.
    #[serde(default)]
    pub reports: ReportConfig,
    /// Task registry settings.
    #[serde(default)]
    pub tasks: TaskConfig,
    /// Telegram bot settings.
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Media host settings.
    #[serde(default)]
    pub media: MediaConfig,
    /// Timeout configuration.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Shared secret `jobdesk-ctl` must present (populated at runtime).
    #[serde(skip)]
    pub ipc_auth_token: Option<String>,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load runtime credentials from OS keychain with env-var fallback.
    ///
    /// The Telegram token is mandatory only when the bot is enabled. Media
    /// credentials and the IPC token are optional; when absent, photo
    /// uploads fail and the IPC server accepts unauthenticated requests.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the bot is enabled and no token is found.
    pub async fn load_credentials(&mut self) -> Result<()> {
        if self.telegram.enabled {
            self.telegram.bot_token =
                load_credential("telegram_bot_token", "TELEGRAM_BOT_TOKEN").await?;
        }
        self.media.api_key = load_credential("media_api_key", "MEDIA_API_KEY")
            .await
            .unwrap_or_default();
        self.media.api_secret = load_credential("media_api_secret", "MEDIA_API_SECRET")
            .await
            .unwrap_or_default();
        self.ipc_auth_token = load_credential("ipc_auth_token", "JOBDESK_IPC_TOKEN")
            .await
            .ok();
        Ok(())
    }

    /// Timezone that decides the calendar date used for "today".
    #[must_use]
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }

    /// Bound applied to each upstream call.
    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.upstream_seconds)
    }

    fn validate(&self) -> Result<()> {
        validate_scheme("reports", &self.reports.id_prefix, self.reports.id_width)?;
        validate_scheme("tasks", &self.tasks.id_prefix, self.tasks.id_width)?;

        if self.reports.id_prefix == self.tasks.id_prefix {
            return Err(AppError::Config(
                "reports and tasks must use different id prefixes".into(),
            ));
        }

        if self.reports.insert_attempts == 0 {
            return Err(AppError::Config(
                "reports.insert_attempts must be greater than zero".into(),
            ));
        }

        if self.utc_offset_minutes.abs() > 18 * 60 {
            return Err(AppError::Config(
                "utc_offset_minutes must be within ±18 hours".into(),
            ));
        }

        if self.timeouts.upstream_seconds == 0 {
            return Err(AppError::Config(
                "timeouts.upstream_seconds must be greater than zero".into(),
            ));
        }

        if self.timeouts.notify_interval_seconds == 0 {
            return Err(AppError::Config(
                "timeouts.notify_interval_seconds must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

fn validate_scheme(section: &str, prefix: &str, width: usize) -> Result<()> {
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::Config(format!(
            "{section}.id_prefix must be a non-empty alphabetic string"
        )));
    }
    if width == 0 {
        return Err(AppError::Config(format!(
            "{section}.id_width must be greater than zero"
        )));
    }
    Ok(())
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            tracing::debug!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    match env::var(env_key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))),
    }
}
