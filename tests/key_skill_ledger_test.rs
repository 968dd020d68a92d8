mod common;

use common::InMemoryStore;
use vacancy_analytics_backend::services::skill_ledger::SkillLedger;

#[tokio::test]
async fn sync_creates_active_rows_for_observed_skills() {
    let store = InMemoryStore::new();
    let ledger = SkillLedger::new(store.clone());

    ledger.sync(1, ["Rust", "PostgreSQL"]).await.unwrap();

    let rows = store.skill_rows(1);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.is_active));
}

#[tokio::test]
async fn resync_with_same_skills_adds_nothing() {
    let store = InMemoryStore::new();
    let ledger = SkillLedger::new(store.clone());

    ledger.sync(1, ["Rust", "PostgreSQL"]).await.unwrap();
    ledger.sync(1, ["Rust", "PostgreSQL"]).await.unwrap();

    assert_eq!(store.skill_rows(1).len(), 2);
}

#[tokio::test]
async fn vanished_skill_is_deactivated_not_deleted() {
    let store = InMemoryStore::new();
    let ledger = SkillLedger::new(store.clone());

    ledger.sync(1, ["Rust", "PostgreSQL"]).await.unwrap();
    ledger.sync(1, ["Rust"]).await.unwrap();

    let rows = store.skill_rows(1);
    assert_eq!(rows.len(), 2);
    let inactive: Vec<_> = rows.iter().filter(|r| !r.is_active).collect();
    assert_eq!(inactive.len(), 1);
    assert_eq!(
        store.skill_name(inactive[0].key_skill_id).as_deref(),
        Some("PostgreSQL")
    );
}

#[tokio::test]
async fn returning_skill_reactivates_the_existing_row() {
    let store = InMemoryStore::new();
    let ledger = SkillLedger::new(store.clone());

    ledger.sync(1, ["Rust", "PostgreSQL"]).await.unwrap();
    ledger.sync(1, ["Rust"]).await.unwrap();
    let before = store.skill_rows(1);
    ledger.sync(1, ["Rust", "PostgreSQL"]).await.unwrap();

    let after = store.skill_rows(1);
    // same rows toggled, no duplicates
    assert_eq!(after.len(), before.len());
    assert!(after.iter().all(|r| r.is_active));
}

#[tokio::test]
async fn at_most_one_active_row_per_pair_after_any_sequence() {
    let store = InMemoryStore::new();
    let ledger = SkillLedger::new(store.clone());

    ledger.sync(1, ["Rust"]).await.unwrap();
    ledger.sync(1, Vec::<String>::new()).await.unwrap();
    ledger.sync(1, ["Rust"]).await.unwrap();
    ledger.sync(1, ["Rust"]).await.unwrap();

    let rows = store.skill_rows(1);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_active);
}
