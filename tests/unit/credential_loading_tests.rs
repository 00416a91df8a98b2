//! Credential loading from environment variables.
//!
//! These tests mutate process-global env vars and run serially. The
//! `jobdesk` keychain service is assumed absent in test environments.

use jobdesk::config::GlobalConfig;
use jobdesk::AppError;

const VARS: [&str; 4] = [
    "TELEGRAM_BOT_TOKEN",
    "MEDIA_API_KEY",
    "MEDIA_API_SECRET",
    "JOBDESK_IPC_TOKEN",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[tokio::test]
#[serial_test::serial]
async fn env_var_credentials_are_loaded() {
    clear_env();
    std::env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
    std::env::set_var("MEDIA_API_KEY", "key");
    std::env::set_var("MEDIA_API_SECRET", "secret");
    std::env::set_var("JOBDESK_IPC_TOKEN", "ipc");

    let mut config = GlobalConfig::from_toml_str("[media]\nupload_url = \"https://m.example\"\n")
        .expect("config parses");
    config.load_credentials().await.expect("credentials load");

    assert_eq!(config.telegram.bot_token, "123:abc");
    assert!(config.media.is_configured());
    assert_eq!(config.ipc_auth_token.as_deref(), Some("ipc"));
    clear_env();
}

#[tokio::test]
#[serial_test::serial]
async fn missing_bot_token_fails_when_enabled() {
    clear_env();
    let mut config = GlobalConfig::from_toml_str("").expect("config parses");

    let result = config.load_credentials().await;
    match result {
        Err(AppError::Config(msg)) => assert!(msg.contains("TELEGRAM_BOT_TOKEN")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[tokio::test]
#[serial_test::serial]
async fn disabled_bot_needs_no_token() {
    clear_env();
    let mut config =
        GlobalConfig::from_toml_str("[telegram]\nenabled = false\n").expect("config parses");

    config.load_credentials().await.expect("credentials load");
    assert!(config.telegram.bot_token.is_empty());
    assert!(!config.media.is_configured());
    assert!(config.ipc_auth_token.is_none());
}

#[tokio::test]
#[serial_test::serial]
async fn blank_env_value_counts_as_missing() {
    clear_env();
    std::env::set_var("TELEGRAM_BOT_TOKEN", "   ");
    let mut config = GlobalConfig::from_toml_str("").expect("config parses");

    assert!(config.load_credentials().await.is_err());
    clear_env();
}
