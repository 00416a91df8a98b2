use jobdesk::config::MediaConfig;
use jobdesk::media::http::{sign_params, HttpMediaHost};
use jobdesk::AppError;

#[test]
fn signature_is_lowercase_hex_and_order_independent() {
    let sig = sign_params(
        &[("timestamp", "1700000000"), ("folder", "task-reports")],
        "secret",
    );
    assert_eq!(sig.len(), 64);
    assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    let again = sign_params(
        &[("folder", "task-reports"), ("timestamp", "1700000000")],
        "secret",
    );
    assert_eq!(sig, again);
}

#[test]
fn signature_changes_with_parameters() {
    let a = sign_params(&[("folder", "a"), ("timestamp", "1")], "secret");
    let b = sign_params(&[("folder", "b"), ("timestamp", "1")], "secret");
    assert_ne!(a, b);
}

#[test]
fn unconfigured_host_is_refused() {
    let result = HttpMediaHost::from_config(&MediaConfig::default());
    assert!(matches!(result, Err(AppError::Config(_))));
}
