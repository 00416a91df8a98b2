use std::sync::Arc;

use jobdesk::models::worker::{Registration, Role, Worker};
use jobdesk::persistence::{db, worker_repo::WorkerRepo};

#[tokio::test]
async fn register_creates_worker() {
    let repo = WorkerRepo::new(Arc::new(db::connect_memory().await.expect("db")));

    let outcome = repo.register(&Worker::new("budi".into(), 42)).await.expect("register");
    assert!(matches!(outcome, Registration::Created(_)));

    let found = repo.find_by_telegram_id(42).await.expect("find").expect("exists");
    assert_eq!(found.name, "budi");
    assert_eq!(found.role, Role::Worker);
}

#[tokio::test]
async fn second_registration_keeps_original_record() {
    let repo = WorkerRepo::new(Arc::new(db::connect_memory().await.expect("db")));

    let first = repo.register(&Worker::new("budi".into(), 42)).await.expect("register");
    let second = repo.register(&Worker::new("renamed".into(), 42)).await.expect("register");

    match second {
        Registration::AlreadyRegistered(w) => {
            assert_eq!(w.id, first.worker().id);
            assert_eq!(w.name, "budi");
        }
        Registration::Created(_) => panic!("duplicate registration created a record"),
    }
    assert_eq!(repo.count().await.expect("count"), 1);
}

#[tokio::test]
async fn unknown_identity_is_none() {
    let repo = WorkerRepo::new(Arc::new(db::connect_memory().await.expect("db")));
    assert!(repo.find_by_telegram_id(7).await.expect("find").is_none());
}
