use std::time::Duration;

use dunmore::Record;

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn create_then_list_roundtrips_fields() {
    let store = util::memory_store().await;

    let draft = util::sample_record("Alice Smith");
    let id = store.create(&draft).await.expect("create succeeds");
    assert!(id > 0);

    let all = store.list_all().await;
    assert_eq!(all.len(), 1);
    let row = &all[0];
    assert_eq!(row.id, id);
    assert_eq!(row.name, "Alice Smith");
    assert_eq!(row.email.as_deref(), Some("alice.smith@example.com"));
    assert_eq!(row.phone.as_deref(), Some("555-0100-200"));
    assert_eq!(row.company.as_deref(), Some("Acme"));
    assert_eq!(row.position.as_deref(), Some("Engineer"));
    assert_eq!(row.notes.as_deref(), Some("met at the trade fair"));
    assert_eq!(row.created_by.as_deref(), Some("tester"));
    assert!(row.created_at > 0);
    assert_eq!(row.created_at, row.updated_at);
}

#[tokio::test]
async fn create_ignores_caller_supplied_id_and_timestamps() {
    let store = util::memory_store().await;

    let mut draft = util::sample_record("Bob Jones");
    draft.id = 9_999;
    draft.created_at = 1;
    draft.updated_at = 2;

    let id = store.create(&draft).await.expect("create succeeds");
    assert_ne!(id, 9_999);

    let row = store.list_all().await.pop().expect("row present");
    assert_eq!(row.id, id);
    assert!(row.created_at > 2);
}

#[tokio::test]
async fn missing_created_by_defaults_to_unknown() {
    let store = util::memory_store().await;

    store
        .create(&Record::named("Nameless Author"))
        .await
        .expect("create succeeds");

    let row = store.list_all().await.pop().expect("row present");
    assert_eq!(row.created_by.as_deref(), Some("Unknown"));
}

#[tokio::test]
async fn update_refreshes_updated_at_and_preserves_created_at() {
    let store = util::memory_store().await;

    let id = store
        .create(&util::sample_record("Alice Smith"))
        .await
        .expect("create succeeds");
    let before = store.list_all().await.pop().expect("row present");

    // The trigger stamps update time; give the clock room to move.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut edited = before.clone();
    edited.phone = Some("555-0123-456".to_string());
    assert!(store.update(&edited).await);

    let after = store.list_all().await.pop().expect("row present");
    assert_eq!(after.id, id);
    assert_eq!(after.phone.as_deref(), Some("555-0123-456"));
    assert_eq!(after.created_at, before.created_at);
    assert!(
        after.updated_at > after.created_at,
        "updated_at {} should exceed created_at {}",
        after.updated_at,
        after.created_at
    );
}

#[tokio::test]
async fn update_ignores_caller_supplied_updated_at() {
    let store = util::memory_store().await;

    store
        .create(&util::sample_record("Alice Smith"))
        .await
        .expect("create succeeds");
    let mut edited = store.list_all().await.pop().expect("row present");

    tokio::time::sleep(Duration::from_millis(50)).await;
    edited.updated_at = 1; // must not stick
    edited.notes = Some("edited".to_string());
    assert!(store.update(&edited).await);

    let after = store.list_all().await.pop().expect("row present");
    assert!(after.updated_at >= after.created_at);
    assert_ne!(after.updated_at, 1);
}

#[tokio::test]
async fn update_of_missing_row_reports_false() {
    let store = util::memory_store().await;

    let mut ghost = util::sample_record("Ghost");
    ghost.id = 12_345;
    assert!(!store.update(&ghost).await);
}

#[tokio::test]
async fn delete_removes_row_and_missing_id_reports_false() {
    let store = util::memory_store().await;

    let id = store
        .create(&util::sample_record("Alice Smith"))
        .await
        .expect("create succeeds");

    assert!(store.delete(id).await);
    assert!(store.list_all().await.iter().all(|r| r.id != id));
    assert_eq!(store.count().await, 0);

    assert!(!store.delete(id).await);
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn identifiers_are_not_reused_after_delete() {
    let store = util::memory_store().await;

    let first = store
        .create(&util::sample_record("First"))
        .await
        .expect("create succeeds");
    assert!(store.delete(first).await);

    let second = store
        .create(&util::sample_record("Second"))
        .await
        .expect("create succeeds");
    assert!(second > first);
}

#[tokio::test]
async fn delete_many_reports_the_count_actually_removed() {
    let store = util::memory_store().await;

    let a = store
        .create(&util::sample_record("A"))
        .await
        .expect("create succeeds");
    let b = store
        .create(&util::sample_record("B"))
        .await
        .expect("create succeeds");
    let c = store
        .create(&util::sample_record("C"))
        .await
        .expect("create succeeds");

    // One id in the middle of the batch does not exist; the others still
    // go through.
    let removed = store.delete_many(&[a, 77_777, c]).await;
    assert_eq!(removed, 2);

    let survivors = store.list_all().await;
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].id, b);
}

#[tokio::test]
async fn count_matches_list_length_as_state_evolves() {
    let store = util::memory_store().await;
    assert_eq!(store.count().await, store.list_all().await.len() as i64);

    for name in ["A", "B", "C"] {
        store
            .create(&util::sample_record(name))
            .await
            .expect("create succeeds");
        assert_eq!(store.count().await, store.list_all().await.len() as i64);
    }

    let first = store.list_all().await.pop().expect("row present");
    store.delete(first.id).await;
    assert_eq!(store.count().await, store.list_all().await.len() as i64);
}

#[tokio::test]
async fn initialize_is_idempotent() {
    let store = util::memory_store().await;
    store.initialize().await.expect("second initialize");

    store
        .create(&util::sample_record("Still Works"))
        .await
        .expect("create succeeds");
    assert_eq!(store.count().await, 1);
}
