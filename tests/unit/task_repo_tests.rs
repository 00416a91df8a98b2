use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use jobdesk::models::ident::IdScheme;
use jobdesk::models::task::TaskDraft;
use jobdesk::persistence::{db, task_repo::TaskRepo};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).expect("valid date")
}

fn draft(title: &str, date: NaiveDate) -> TaskDraft {
    TaskDraft {
        title: title.into(),
        description: None,
        assigned_date: date,
        created_by: "supervisor".into(),
        created_at: Utc::now(),
    }
}

async fn repo() -> TaskRepo {
    TaskRepo::new(Arc::new(db::connect_memory().await.expect("db")))
}

#[tokio::test]
async fn identifiers_are_sequential() {
    let repo = repo().await;
    let ids = IdScheme::new("TASK", 3);

    let first = repo.create(&ids, 5, &draft("Fix pump", day(1))).await.expect("create");
    let second = repo.create(&ids, 5, &draft("Paint wall", day(1))).await.expect("create");

    assert_eq!(first.id, "TASK001");
    assert_eq!(second.id, "TASK002");
}

#[tokio::test]
async fn find_assigned_respects_date() {
    let repo = repo().await;
    let ids = IdScheme::new("TASK", 3);
    let task = repo.create(&ids, 5, &draft("Fix pump", day(1))).await.expect("create");

    assert!(repo.find_assigned(&task.id, day(1)).await.expect("query").is_some());
    assert!(repo.find_assigned(&task.id, day(2)).await.expect("query").is_none());
    assert!(repo.find_assigned("TASK999", day(1)).await.expect("query").is_none());
}

#[tokio::test]
async fn list_for_date_orders_numerically() {
    let repo = repo().await;
    let ids = IdScheme::new("T", 1);
    for n in 0..10 {
        repo.create(&ids, 5, &draft(&format!("job {n}"), day(3)))
            .await
            .expect("create");
    }
    repo.create(&ids, 5, &draft("other day", day(4))).await.expect("create");

    let listed = repo.list_for_date(day(3)).await.expect("list");
    let ids: Vec<&str> = listed.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), 10);
    assert_eq!(ids.first(), Some(&"T1"));
    assert_eq!(ids.last(), Some(&"T10"));
}

#[tokio::test]
async fn round_trips_fields() {
    let repo = repo().await;
    let mut input = draft("Inspect valve", day(5));
    input.description = Some("north site".into());
    let created = repo
        .create(&IdScheme::new("TASK", 3), 5, &input)
        .await
        .expect("create");

    let fetched = repo.get_by_id(&created.id).await.expect("get").expect("exists");
    assert_eq!(fetched.title, "Inspect valve");
    assert_eq!(fetched.description.as_deref(), Some("north site"));
    assert_eq!(fetched.assigned_date, day(5));
    assert_eq!(repo.list_all().await.expect("list").len(), 1);
}
