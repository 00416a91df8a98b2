#![forbid(unsafe_code)]

//! `jobdesk` — field job tracker server binary.
//!
//! Bootstraps configuration, the database, the dashboard HTTP API, the IPC
//! server for `jobdesk-ctl`, the review notification sweep, and the
//! Telegram bot.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use teloxide::Bot;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use jobdesk::chat::telegram::{self, TelegramTransport};
use jobdesk::chat::ChatTransport;
use jobdesk::config::GlobalConfig;
use jobdesk::feed::ChangeFeed;
use jobdesk::media::http::HttpMediaHost;
use jobdesk::media::MediaHost;
use jobdesk::persistence::db;
use jobdesk::state::AppState;
use jobdesk::workflow::notify;
use jobdesk::{http, ipc, AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "jobdesk", about = "Field job tracker server", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the database file from the configuration.
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("jobdesk server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match args.config {
        Some(ref path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::from_toml_str("")?,
    };
    if let Some(db_path) = args.db {
        config.db_path = db_path;
    }
    config.load_credentials().await?;
    let config = Arc::new(config);
    info!("configuration loaded");

    // ── Initialize database ─────────────────────────────
    let db = Arc::new(db::connect(&config.db_path).await?);
    info!(db_path = %config.db_path.display(), "database connected");

    // ── Upstream clients ────────────────────────────────
    let bot = (config.telegram.enabled && !config.telegram.bot_token.is_empty())
        .then(|| Bot::new(&config.telegram.bot_token));
    let chat: Option<Arc<dyn ChatTransport>> = bot
        .clone()
        .map(|b| Arc::new(TelegramTransport::new(b)) as Arc<dyn ChatTransport>);
    if chat.is_none() {
        info!("telegram not configured; running dashboard only");
    }

    let media: Option<Arc<dyn MediaHost>> = if config.media.is_configured() {
        Some(Arc::new(HttpMediaHost::from_config(&config.media)?))
    } else {
        warn!("media host not configured; photo reports will fail");
        None
    };

    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        db,
        chat,
        media,
        changes: ChangeFeed::default(),
    });

    // ── Background services ─────────────────────────────
    let ct = CancellationToken::new();
    let notify_handle = notify::spawn_notify_task(Arc::clone(&state), ct.clone());
    let ipc_handle = ipc::server::spawn_ipc_server(Arc::clone(&state), ct.clone())?;

    let http_ct = ct.clone();
    let http_state = Arc::clone(&state);
    let http_handle = tokio::spawn(async move {
        if let Err(err) = http::serve_http(http_state, http_ct).await {
            error!(%err, "dashboard HTTP API failed");
        }
    });

    let bot_handle = bot.map(|b| telegram::spawn_bot(Arc::clone(&state), b, ct.clone()));

    info!("jobdesk server ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    let _ = tokio::join!(notify_handle, ipc_handle, http_handle);
    if let Some(handle) = bot_handle {
        let _ = handle.await;
    }
    info!("jobdesk shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
