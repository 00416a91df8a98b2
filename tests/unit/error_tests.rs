use jobdesk::AppError;

#[test]
fn display_prefixes_kind() {
    assert_eq!(AppError::NotFound("SUB009".into()).to_string(), "not found: SUB009");
    assert_eq!(
        AppError::UnknownOrExpiredTask("TASK001".into()).to_string(),
        "unknown or expired task: TASK001"
    );
    assert_eq!(AppError::Timeout("db".into()).to_string(), "timeout: db");
}

#[test]
fn user_message_hides_detail() {
    let err = AppError::PersistenceFailed("UNIQUE constraint failed: task_reports.id".into());
    let msg = err.user_message();
    assert!(!msg.contains("UNIQUE"));
    assert!(!msg.is_empty());
}

#[test]
fn user_message_guides_unregistered_worker() {
    let msg = AppError::NotRegistered("42".into()).user_message();
    assert!(msg.contains("/register"));
}

#[test]
fn toml_errors_become_config_errors() {
    let err: AppError = toml::from_str::<toml::Value>("= broken")
        .expect_err("invalid toml")
        .into();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn caller_message_hides_internal_detail() {
    let err = AppError::ReviewUpdateFailed("db: no such table: task_reports".into());
    assert_eq!(err.caller_message(), "failed to update review");
    assert_eq!(
        AppError::Db("disk I/O error".into()).caller_message(),
        "storage unavailable"
    );
    assert_eq!(
        AppError::Timeout("report insert exceeded 30s".into()).caller_message(),
        "upstream call timed out"
    );
}

#[test]
fn caller_message_keeps_caller_fault_detail() {
    let err = AppError::AlreadyReviewed("report SUB001 is approved".into());
    assert!(err.is_caller_fault());
    assert_eq!(
        err.caller_message(),
        "already reviewed: report SUB001 is approved"
    );
    assert!(!AppError::PersistenceFailed("x".into()).is_caller_fault());
}
