mod common;

use common::TestApp;
use sports_booking_backend::domain::models::{ledger::SkillLevel, member::Member};
use sports_booking_backend::domain::ports::LedgerStore;
use sports_booking_backend::error::AppError;
use sports_booking_backend::infra::repositories::sqlite_occurrence_repo::SqliteOccurrenceRepo;
use chrono::{Duration, TimeZone, Utc};
use sports_booking_backend::domain::services::attendance_service::NewEventParams;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_concurrent_joins_never_overrun_capacity() {
    let app = TestApp::new().await;
    let capacity = 5;
    let key = app.seed_event(3, capacity, 0, SkillLevel::Basic).await;

    let mut set = JoinSet::new();
    for i in 0..12 {
        let state = app.state.clone();
        let key = key.clone();
        set.spawn(async move {
            let member = Member::new(&format!("player{}@example.com", i), &format!("Player {}", i), SkillLevel::Basic);
            state.attendance.join(&key, &member).await
        });
    }

    let mut joined = 0;
    let mut full = 0;
    while let Some(result) = set.join_next().await {
        match result.unwrap() {
            Ok(_) => joined += 1,
            Err(AppError::CapacityExceeded) => full += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(joined, capacity);
    assert_eq!(full, 12 - capacity);

    let entry = app.state.attendance.get_event(&key).await.unwrap();
    assert_eq!(entry.record.attendees.len(), capacity as usize);
}

#[tokio::test]
async fn test_concurrent_joins_and_leaves_keep_every_update() {
    let app = TestApp::new().await;
    let key = app.seed_event(3, 50, 0, SkillLevel::Basic).await;

    let stayers: Vec<Member> = (0..10)
        .map(|i| Member::new(&format!("stay{}@example.com", i), "Stay", SkillLevel::Basic))
        .collect();
    let leaver = Member::new("leaver@example.com", "Leaver", SkillLevel::Basic);
    app.state.attendance.join(&key, &leaver).await.unwrap();

    let mut set = JoinSet::new();
    for member in stayers.clone() {
        let state = app.state.clone();
        let key = key.clone();
        set.spawn(async move { state.attendance.join(&key, &member).await.map(|_| ()) });
    }
    {
        let state = app.state.clone();
        let key = key.clone();
        set.spawn(async move { state.attendance.leave(&key, &leaver).await.map(|_| ()) });
    }

    while let Some(result) = set.join_next().await {
        result.unwrap().unwrap();
    }

    let entry = app.state.attendance.get_event(&key).await.unwrap();
    assert_eq!(entry.record.attendees.len(), stayers.len());
    assert!(!entry.record.is_attending("leaver@example.com"));
}

#[tokio::test]
async fn test_stale_handle_is_a_conflict() {
    let app = TestApp::new().await;
    let key = app.seed_event(3, 10, 0, SkillLevel::Basic).await;
    let store = SqliteOccurrenceRepo::new(app.pool.clone(), chrono_tz::Europe::Stockholm);

    let first = store.fetch_record_text(&key).await.unwrap();
    let second = store.fetch_record_text(&key).await.unwrap();

    store.write_record_text(&first.handle, "price = 10").await.unwrap();
    let result = store.write_record_text(&second.handle, "price = 20").await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(app.raw_description(&key).await, "price = 10");
}

#[tokio::test]
async fn test_unpadded_and_padded_dates_share_one_lock() {
    let app = TestApp::new().await;
    let start = Utc.with_ymd_and_hms(2099, 3, 5, 17, 0, 0).unwrap();
    app.state.attendance.create_occurrence(NewEventParams {
        summary: "Training".to_string(),
        location: String::new(),
        start_time: start,
        end_time: start + Duration::hours(2),
        capacity: Some(3),
        price: 0,
        required_level: SkillLevel::Basic,
    }).await.unwrap();

    let mut set = JoinSet::new();
    for i in 0..10 {
        let state = app.state.clone();
        let key = if i % 2 == 0 { "2099-3-5" } else { "2099-03-05" };
        set.spawn(async move {
            let member = Member::new(&format!("player{}@example.com", i), "Player", SkillLevel::Basic);
            state.attendance.join(key, &member).await
        });
    }

    let mut joined = 0;
    while let Some(result) = set.join_next().await {
        match result.unwrap() {
            Ok(entry) => {
                assert_eq!(entry.record.id, "2099-03-05");
                joined += 1;
            }
            Err(AppError::CapacityExceeded) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(joined, 3);
    let entry = app.state.attendance.get_event("2099-3-5").await.unwrap();
    assert_eq!(entry.record.attendees.len(), 3);
}
