mod common;

use common::InMemoryStore;
use vacancy_analytics_backend::models::status_history::TransitionKind;
use vacancy_analytics_backend::models::vacancy::VacancyStatus;
use vacancy_analytics_backend::services::status_tracker::StatusTracker;

#[tokio::test]
async fn initial_load_records_absent_to_active() {
    let store = InMemoryStore::new();
    let tracker = StatusTracker::new(store.clone());
    let query = store.add_search_query("rust", "user@example.com");
    let vacancy = store.seed_vacancy("1", query.id, VacancyStatus::Active, 0);

    tracker.record_initial_load(&vacancy).await.unwrap();

    let rows = store.status_rows(vacancy.id);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].prev_status, VacancyStatus::ABSENT_LABEL);
    assert_eq!(rows[0].cur_status, "Активный");
    assert_eq!(rows[0].duration_days, 0);
    assert_eq!(rows[0].type_changed, TransitionKind::InitialLoad.as_str());
    assert_eq!(rows[0].created_at_prev_status, rows[0].created_at_cur_status);
}

#[tokio::test]
async fn archive_records_duration_in_whole_days() {
    let store = InMemoryStore::new();
    let tracker = StatusTracker::new(store.clone());
    let query = store.add_search_query("rust", "user@example.com");
    let vacancy = store.seed_vacancy("5", query.id, VacancyStatus::Active, 10);

    let transitioned = tracker.archive(&vacancy).await.unwrap();
    assert!(transitioned);

    let rows = store.status_rows(vacancy.id);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].prev_status, "Активный");
    assert_eq!(rows[0].cur_status, "Архивный");
    assert_eq!(rows[0].duration_days, 10);
    assert!(store.vacancy("5").unwrap().is_archived());
}

#[tokio::test]
async fn repeated_archive_is_guarded() {
    let store = InMemoryStore::new();
    let tracker = StatusTracker::new(store.clone());
    let query = store.add_search_query("rust", "user@example.com");
    let vacancy = store.seed_vacancy("5", query.id, VacancyStatus::Active, 3);

    assert!(tracker.archive(&vacancy).await.unwrap());
    let archived = store.vacancy("5").unwrap();
    assert!(!tracker.archive(&archived).await.unwrap());

    assert_eq!(store.status_rows(vacancy.id).len(), 1);
}

#[tokio::test]
async fn revive_requires_an_archived_vacancy() {
    let store = InMemoryStore::new();
    let tracker = StatusTracker::new(store.clone());
    let query = store.add_search_query("rust", "user@example.com");
    let vacancy = store.seed_vacancy("6", query.id, VacancyStatus::Active, 2);

    assert!(!tracker.revive(&vacancy).await.unwrap());
    assert!(store.status_rows(vacancy.id).is_empty());
}

#[tokio::test]
async fn archive_then_revive_leaves_two_ordered_history_rows() {
    let store = InMemoryStore::new();
    let tracker = StatusTracker::new(store.clone());
    let query = store.add_search_query("rust", "user@example.com");
    let vacancy = store.seed_vacancy("5", query.id, VacancyStatus::Active, 4);

    assert!(tracker.archive(&vacancy).await.unwrap());
    let archived = store.vacancy("5").unwrap();
    assert!(tracker.revive(&archived).await.unwrap());

    let rows = store.status_rows(vacancy.id);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].type_changed, "Отправлена в архив");
    assert_eq!(rows[1].type_changed, "Возобновление");
    assert_eq!(rows[1].cur_status, "Активный");
    assert_eq!(store.vacancy("5").unwrap().status, "Активный");
}
