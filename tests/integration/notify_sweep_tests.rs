//! Review notification sweep.

use std::sync::Arc;

use jobdesk::models::report::{RejectionReason, ReviewDecision};
use jobdesk::workflow::intake::{submit_report, ReportRequest};
use jobdesk::workflow::notify::notify_reviewed;
use jobdesk::workflow::review::review_report;

use super::test_helpers::{
    exec, register, state_with_fakes, test_config, test_state, today_task, FakeChat, FakeMedia,
};

async fn submit(state: &jobdesk::state::AppState) -> String {
    submit_report(
        state,
        ReportRequest {
            telegram_id: 42,
            task_id: "TASK001".into(),
            note: None,
            today: state.today(),
            photo: None,
        },
    )
    .await
    .expect("submit")
    .id
}

#[tokio::test]
async fn reviewed_reports_are_announced_once() {
    let (state, chat, _media) = state_with_fakes().await;
    register(&state, 42, "budi").await;
    today_task(&state, "Fix pump").await;
    let approved = submit(&state).await;
    let rejected = submit(&state).await;
    let _pending = submit(&state).await;

    review_report(&state, &approved, &ReviewDecision::Approve, None)
        .await
        .expect("approve");
    let reason = RejectionReason::new("wrong site").expect("reason");
    review_report(&state, &rejected, &ReviewDecision::Reject(reason), None)
        .await
        .expect("reject");

    assert_eq!(notify_reviewed(&state).await.expect("sweep"), 2);
    let sent = chat.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|(chat_id, _)| *chat_id == 42));
    assert!(sent.iter().any(|(_, m)| m.contains("SUB001") && m.contains("approved")));
    assert!(sent.iter().any(|(_, m)| m.contains("SUB002") && m.contains("wrong site")));

    assert_eq!(notify_reviewed(&state).await.expect("sweep"), 0);
    assert_eq!(chat.sent().len(), 2);
}

#[tokio::test]
async fn failed_delivery_is_retried_next_sweep() {
    let failing = Arc::new(FakeChat {
        fail_send: true,
        ..FakeChat::default()
    });
    let state = test_state(
        test_config(),
        Some(failing),
        Some(Arc::new(FakeMedia::default())),
    )
    .await;
    register(&state, 42, "budi").await;
    today_task(&state, "Fix pump").await;
    let id = submit(&state).await;
    review_report(&state, &id, &ReviewDecision::Approve, None)
        .await
        .expect("approve");

    assert_eq!(notify_reviewed(&state).await.expect("sweep"), 0);

    let repo = jobdesk::persistence::report_repo::ReportRepo::new(Arc::clone(&state.db));
    assert_eq!(repo.list_unnotified_reviews().await.expect("list").len(), 1);
}

#[tokio::test]
async fn no_transport_sends_nothing() {
    let state = test_state(test_config(), None, None).await;
    assert_eq!(notify_reviewed(&state).await.expect("sweep"), 0);
}

#[tokio::test]
async fn unmarked_report_does_not_stop_the_sweep() {
    let (state, chat, _media) = state_with_fakes().await;
    register(&state, 42, "budi").await;
    today_task(&state, "Fix pump").await;
    let first = submit(&state).await;
    let second = submit(&state).await;
    for id in [&first, &second] {
        review_report(&state, id, &ReviewDecision::Approve, None)
            .await
            .expect("approve");
    }

    exec(
        &state,
        "CREATE TRIGGER lock_first BEFORE UPDATE OF notified ON task_reports
         WHEN NEW.id = 'SUB001'
         BEGIN SELECT RAISE(ABORT, 'notified flag locked'); END",
    )
    .await;

    assert_eq!(notify_reviewed(&state).await.expect("sweep"), 2);
    assert_eq!(chat.sent().len(), 2);

    let repo = jobdesk::persistence::report_repo::ReportRepo::new(Arc::clone(&state.db));
    let left: Vec<String> = repo
        .list_unnotified_reviews()
        .await
        .expect("list")
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(left, vec![first]);
}
