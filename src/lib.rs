#![forbid(unsafe_code)]

//! Field job tracker: workers report task completion over Telegram,
//! supervisors review reports from a dashboard.

pub mod chat;
pub mod config;
pub mod errors;
pub mod feed;
pub mod http;
pub mod ipc;
pub mod media;
pub mod models;
pub mod persistence;
pub mod state;
pub mod workflow;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
