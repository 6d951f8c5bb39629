use catchall_detector::domain::entities::{Event, EventKind};
use catchall_detector::domain::repositories::CounterStore;
use catchall_detector::infrastructure::persistence::PgCounterStore;
use sqlx::PgPool;
use std::sync::Arc;

async fn make_store(pool: PgPool) -> PgCounterStore {
    let store = PgCounterStore::new(Arc::new(pool));
    store.ensure_schema().await.unwrap();
    store
}

#[sqlx::test(migrations = false)]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_query_unseen_domain_returns_zero_record(pool: PgPool) {
    let store = make_store(pool).await;

    let record = store.query("never-seen.com").await.unwrap();

    assert_eq!(record.name, "never-seen.com");
    assert_eq!(record.bounced, 0);
    assert_eq!(record.delivered, 0);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_insert_creates_and_increments(pool: PgPool) {
    let store = make_store(pool).await;

    store.insert(&Event::delivered("example.com")).await.unwrap();
    store.insert(&Event::delivered("example.com")).await.unwrap();
    store.insert(&Event::bounced("example.com")).await.unwrap();

    let record = store.query("example.com").await.unwrap();

    assert_eq!(record.delivered, 2);
    assert_eq!(record.bounced, 1);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_domains_are_independent(pool: PgPool) {
    let store = make_store(pool).await;

    store.insert(&Event::bounced("a.com")).await.unwrap();
    store.insert(&Event::delivered("b.com")).await.unwrap();

    let a = store.query("a.com").await.unwrap();
    let b = store.query("b.com").await.unwrap();

    assert_eq!((a.bounced, a.delivered), (1, 0));
    assert_eq!((b.bounced, b.delivered), (0, 1));
}

#[sqlx::test(migrations = false)]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_concurrent_first_inserts_do_not_conflict(pool: PgPool) {
    let store = Arc::new(make_store(pool).await);

    let mut handles = Vec::new();
    for _ in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .insert(&Event::new("race.com", EventKind::Delivered))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let record = store.query("race.com").await.unwrap();
    assert_eq!(record.delivered, 20);
}

#[sqlx::test(migrations = false)]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_ensure_schema_is_idempotent(pool: PgPool) {
    let store = make_store(pool).await;

    store.ensure_schema().await.unwrap();

    assert!(store.health_check().await);
}
