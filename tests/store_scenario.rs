use std::time::Duration;

use dunmore::Record;

#[path = "util.rs"]
mod util;

/// The end-to-end walkthrough from the product brief: two people enter
/// records, one gets edited, one gets removed.
#[tokio::test]
async fn two_users_entering_editing_and_deleting() {
    let (_dir, store) = util::temp_store().await;

    let alice = Record {
        email: Some("alice@example.com".to_string()),
        ..Record::named("Alice Smith")
    };
    let alice_id = store.create(&alice).await.expect("create alice");
    assert_eq!(alice_id, 1);
    assert_eq!(store.count().await, 1);

    tokio::time::sleep(Duration::from_millis(50)).await;

    let bob_id = store
        .create(&Record::named("Bob Jones"))
        .await
        .expect("create bob");
    assert_eq!(bob_id, 2);

    // Most recently touched first.
    let names: Vec<String> = store.list_all().await.into_iter().map(|r| r.name).collect();
    assert_eq!(names, ["Bob Jones", "Alice Smith"]);

    // Editing Alice moves her back to the top.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let mut alice_row = store
        .list_all()
        .await
        .into_iter()
        .find(|r| r.id == alice_id)
        .expect("alice present");
    alice_row.phone = Some("555-867-5309-00".to_string());
    assert!(store.update(&alice_row).await);

    let names: Vec<String> = store.list_all().await.into_iter().map(|r| r.name).collect();
    assert_eq!(names, ["Alice Smith", "Bob Jones"]);

    // Bob goes away entirely.
    assert!(store.delete(bob_id).await);
    assert_eq!(store.count().await, 1);
    let remaining = store.list_all().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "Alice Smith");
    assert_eq!(remaining[0].phone.as_deref(), Some("555-867-5309-00"));
}
