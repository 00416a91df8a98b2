use chrono::{TimeZone, Utc};

use jobdesk::models::report::{
    RejectionReason, ReportStatus, ReviewDecision, ReviewState, Transition,
};
use jobdesk::AppError;

fn at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).single().expect("valid time")
}

#[test]
fn pending_accepts_approval() {
    let outcome = ReviewState::Pending
        .transition(&ReviewDecision::Approve, "alice", at())
        .expect("transition");

    assert_eq!(
        outcome,
        Transition::Applied(ReviewState::Approved {
            reviewed_at: at(),
            reviewer: "alice".into(),
        })
    );
}

#[test]
fn pending_accepts_rejection_with_reason() {
    let reason = RejectionReason::new("  photo is blurry ").expect("reason");
    let outcome = ReviewState::Pending
        .transition(&ReviewDecision::Reject(reason), "bob", at())
        .expect("transition");

    match outcome {
        Transition::Applied(ReviewState::Rejected { reason, .. }) => {
            assert_eq!(reason, "photo is blurry");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn repeating_a_decision_is_unchanged() {
    let approved = ReviewState::Approved {
        reviewed_at: at(),
        reviewer: "alice".into(),
    };
    let outcome = approved
        .transition(&ReviewDecision::Approve, "bob", Utc::now())
        .expect("transition");
    assert_eq!(outcome, Transition::Unchanged);
}

#[test]
fn reversing_a_decision_is_refused() {
    let approved = ReviewState::Approved {
        reviewed_at: at(),
        reviewer: "alice".into(),
    };
    let reason = RejectionReason::new("changed my mind").expect("reason");
    let result = approved.transition(&ReviewDecision::Reject(reason), "bob", Utc::now());
    assert!(matches!(result, Err(AppError::AlreadyReviewed(_))));
}

#[test]
fn blank_rejection_reason_is_invalid() {
    assert!(matches!(
        RejectionReason::new("   "),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn status_round_trips_storage_form() {
    for status in [
        ReportStatus::Pending,
        ReportStatus::Approved,
        ReportStatus::Rejected,
    ] {
        assert_eq!(ReportStatus::parse(status.as_str()).expect("parse"), status);
    }
    assert!(ReportStatus::parse("archived").is_err());
}

#[test]
fn review_state_serializes_with_status_tag() {
    let json = serde_json::to_value(ReviewState::Rejected {
        reviewed_at: at(),
        reviewer: "bob".into(),
        reason: "wrong site".into(),
    })
    .expect("serialize");

    assert_eq!(json["status"], "rejected");
    assert_eq!(json["reason"], "wrong site");
}
