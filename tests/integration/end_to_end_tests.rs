//! Full worker/supervisor round trip through the chat handler.

use jobdesk::chat::handlers::handle_message;
use jobdesk::models::report::ReviewDecision;
use jobdesk::workflow::review::review_report;

use super::test_helpers::{photo, state_with_fakes, test_config, test_state, text, today_task};

#[tokio::test]
async fn register_report_approve_round_trip() {
    let (state, _chat, _media) = state_with_fakes().await;

    let reply = handle_message(&state, text(42, "/register")).await.expect("reply");
    assert!(reply.contains("Registration successful"));

    let reply = handle_message(&state, text(42, "/task")).await.expect("reply");
    assert_eq!(reply, "No tasks today.");

    let task = today_task(&state, "Fix pump").await;
    assert_eq!(task.id, "TASK001");

    let reply = handle_message(&state, text(42, "/task")).await.expect("reply");
    assert!(reply.contains("TASK001 — not yet worked on"), "{reply}");

    let reply = handle_message(&state, photo(42, "/report TASK001 pump replaced"))
        .await
        .expect("reply");
    assert!(reply.contains("SUB001"), "{reply}");
    assert!(reply.contains("/task"));

    let reply = handle_message(&state, text(42, "/task")).await.expect("reply");
    assert!(reply.contains("TASK001 — pending"), "{reply}");

    review_report(&state, "SUB001", &ReviewDecision::Approve, None)
        .await
        .expect("approve");

    let reply = handle_message(&state, text(42, "/task")).await.expect("reply");
    assert!(reply.contains("TASK001 — approved"), "{reply}");
}

#[tokio::test]
async fn register_twice_reports_existing_record() {
    let (state, _chat, _media) = state_with_fakes().await;

    handle_message(&state, text(42, "/register")).await.expect("reply");
    let reply = handle_message(&state, text(42, "/register")).await.expect("reply");

    assert!(reply.contains("already registered"), "{reply}");
}

#[tokio::test]
async fn unregistered_task_query_is_told_to_register() {
    let state = test_state(test_config(), None, None).await;

    let reply = handle_message(&state, text(7, "/task")).await.expect("reply");
    assert!(reply.contains("/register"), "{reply}");
}

#[tokio::test]
async fn unknown_task_reply_hides_internal_detail() {
    let (state, _chat, _media) = state_with_fakes().await;
    handle_message(&state, text(42, "/register")).await.expect("reply");

    let reply = handle_message(&state, text(42, "/report TASK001")).await.expect("reply");
    assert_eq!(reply, "There is no task with that code for today.");
}

#[tokio::test]
async fn help_and_usage_replies() {
    let state = test_state(test_config(), None, None).await;

    let help = handle_message(&state, text(1, "/start")).await.expect("reply");
    assert!(help.contains("/register"));

    let usage = handle_message(&state, text(1, "/report")).await.expect("reply");
    assert!(usage.starts_with("Usage: /report"));
}

#[tokio::test]
async fn chatter_gets_no_reply() {
    let state = test_state(test_config(), None, None).await;

    assert!(handle_message(&state, text(1, "good morning")).await.is_none());
    let mut bare_photo = photo(1, "");
    bare_photo.text = None;
    assert!(handle_message(&state, bare_photo).await.is_none());
}
