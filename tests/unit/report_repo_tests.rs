use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};

use jobdesk::models::ident::IdScheme;
use jobdesk::models::report::{ReportDraft, ReportStatus, ReviewState};
use jobdesk::models::task::TaskDraft;
use jobdesk::models::worker::Worker;
use jobdesk::persistence::report_repo::ReportRepo;
use jobdesk::persistence::task_repo::TaskRepo;
use jobdesk::persistence::worker_repo::WorkerRepo;
use jobdesk::persistence::{db, SqlitePool};

struct Fixture {
    reports: ReportRepo,
    ids: IdScheme,
}

async fn fixture() -> Fixture {
    let pool: Arc<SqlitePool> = Arc::new(db::connect_memory().await.expect("db"));
    WorkerRepo::new(Arc::clone(&pool))
        .register(&Worker::new("budi".into(), 42))
        .await
        .expect("register");
    TaskRepo::new(Arc::clone(&pool))
        .create(
            &IdScheme::new("TASK", 3),
            5,
            &TaskDraft {
                title: "Fix pump".into(),
                description: None,
                assigned_date: NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"),
                created_by: "supervisor".into(),
                created_at: Utc::now(),
            },
        )
        .await
        .expect("task");

    Fixture {
        reports: ReportRepo::new(pool),
        ids: IdScheme::new("SUB", 3),
    }
}

fn draft(note: Option<&str>) -> ReportDraft {
    ReportDraft {
        task_id: "TASK001".into(),
        submitted_by: 42,
        photo_url: Some("https://media.example/p.jpg".into()),
        note: note.map(str::to_owned),
        submitted_at: Utc::now(),
        placeholder_reviewer: "supervisor".into(),
    }
}

#[tokio::test]
async fn create_stores_pending_report() {
    let fx = fixture().await;

    let report = fx
        .reports
        .create(&fx.ids, 5, &draft(Some("done")))
        .await
        .expect("create");
    assert_eq!(report.id, "SUB001");

    let stored = fx.reports.get_by_id("SUB001").await.expect("get").expect("exists");
    assert_eq!(stored.status(), ReportStatus::Pending);
    assert_eq!(stored.note.as_deref(), Some("done"));
    assert_eq!(stored.photo_url.as_deref(), Some("https://media.example/p.jpg"));
    assert!(!stored.notified);
}

#[tokio::test]
async fn create_requires_existing_task() {
    let fx = fixture().await;
    let mut orphan = draft(None);
    orphan.task_id = "TASK404".into();

    assert!(fx.reports.create(&fx.ids, 5, &orphan).await.is_err());
}

#[tokio::test]
async fn apply_review_only_moves_pending() {
    let fx = fixture().await;
    fx.reports.create(&fx.ids, 5, &draft(None)).await.expect("create");

    let approved = ReviewState::Approved {
        reviewed_at: Utc::now(),
        reviewer: "alice".into(),
    };
    assert!(fx.reports.apply_review("SUB001", &approved).await.expect("update"));
    assert!(!fx.reports.apply_review("SUB001", &approved).await.expect("update"));
    assert!(!fx.reports.apply_review("SUB404", &approved).await.expect("update"));

    let stored = fx.reports.get_by_id("SUB001").await.expect("get").expect("exists");
    assert_eq!(stored.status(), ReportStatus::Approved);
    assert!(stored.review.reviewed_at().is_some());
    assert_eq!(stored.task_id, "TASK001");
    assert_eq!(stored.submitted_by, 42);
}

#[tokio::test]
async fn rejection_stores_reason() {
    let fx = fixture().await;
    fx.reports.create(&fx.ids, 5, &draft(None)).await.expect("create");

    let rejected = ReviewState::Rejected {
        reviewed_at: Utc::now(),
        reviewer: "alice".into(),
        reason: "photo is blurry".into(),
    };
    fx.reports.apply_review("SUB001", &rejected).await.expect("update");

    let stored = fx.reports.get_by_id("SUB001").await.expect("get").expect("exists");
    match stored.review {
        ReviewState::Rejected { reason, reviewer, .. } => {
            assert_eq!(reason, "photo is blurry");
            assert_eq!(reviewer, "alice");
        }
        other => panic!("unexpected review state: {other:?}"),
    }
}

#[tokio::test]
async fn views_join_task_and_worker() {
    let fx = fixture().await;
    let mut older = draft(None);
    older.submitted_at = Utc::now() - Duration::hours(2);
    fx.reports.create(&fx.ids, 5, &older).await.expect("create");
    fx.reports.create(&fx.ids, 5, &draft(None)).await.expect("create");

    let pending = fx.reports.list_pending_views().await.expect("list");
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].report.id, "SUB001");
    assert_eq!(pending[0].task_title.as_deref(), Some("Fix pump"));
    assert_eq!(pending[0].worker_name.as_deref(), Some("budi"));

    let approved = ReviewState::Approved {
        reviewed_at: Utc::now(),
        reviewer: "alice".into(),
    };
    fx.reports.apply_review("SUB002", &approved).await.expect("update");

    let validated = fx.reports.list_validated_views().await.expect("list");
    assert_eq!(validated.len(), 1);
    assert_eq!(validated[0].report.id, "SUB002");
    assert_eq!(fx.reports.list_pending_views().await.expect("list").len(), 1);
}

#[tokio::test]
async fn notified_flag_clears_reviews_from_sweep() {
    let fx = fixture().await;
    fx.reports.create(&fx.ids, 5, &draft(None)).await.expect("create");
    assert!(fx.reports.list_unnotified_reviews().await.expect("list").is_empty());

    let approved = ReviewState::Approved {
        reviewed_at: Utc::now(),
        reviewer: "alice".into(),
    };
    fx.reports.apply_review("SUB001", &approved).await.expect("update");
    assert_eq!(fx.reports.list_unnotified_reviews().await.expect("list").len(), 1);

    fx.reports.mark_notified("SUB001").await.expect("mark");
    assert!(fx.reports.list_unnotified_reviews().await.expect("list").is_empty());
}

#[tokio::test]
async fn counts_by_status() {
    let fx = fixture().await;
    for _ in 0..3 {
        fx.reports.create(&fx.ids, 5, &draft(None)).await.expect("create");
    }
    let approved = ReviewState::Approved {
        reviewed_at: Utc::now(),
        reviewer: "alice".into(),
    };
    fx.reports.apply_review("SUB002", &approved).await.expect("update");

    let counts = fx.reports.count_by_status().await.expect("counts");
    assert!(counts.contains(&(ReportStatus::Pending, 2)));
    assert!(counts.contains(&(ReportStatus::Approved, 1)));
}
