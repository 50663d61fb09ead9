//! End-to-end scenarios: sign-in, dashboard refresh and sign-out against
//! mocked services

use chrono::NaiveDate;
use pulseboard_app::{App, AuthForm, AuthMode};
use pulseboard_core::{Credential, DateBound, DateRange, EventTypeCount, PollStatus};
use pulseboard_integration_tests::{
    BY_TYPE_PATH, DATE_RANGE_PATH, SUMMARY_PATH, Services, wait_for_snapshot,
};
use pulseboard_storage::{CredentialStorage, FileCredentialStorage, SessionStore};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path},
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn session_file(dir: &TempDir) -> Arc<FileCredentialStorage> {
    Arc::new(FileCredentialStorage::new(dir.path().join("session.json")))
}

#[tokio::test]
async fn test_dashboard_breakdown_for_selected_week() {
    let services = Services::start().await;
    services.mount_analytics().await;

    let mut config = services.app_config(Duration::from_secs(30));
    config.initial_range = Some(DateRange::new(date(2024, 1, 1), date(2024, 1, 7)));

    let temp_dir = TempDir::new().unwrap();
    let storage = session_file(&temp_dir);
    storage.save(&Credential::new("abc123")).await.unwrap();

    let mut app = App::new(config, storage).unwrap();
    assert!(app.init().await.unwrap());

    let dashboard = app.dashboard().unwrap();
    let mut rx = dashboard.subscribe();
    wait_for_snapshot(&mut rx, |s| s.status == PollStatus::Ready)
        .await
        .expect("first cycle never completed");

    let data = dashboard.view().data.unwrap();
    assert_eq!(
        data.breakdown,
        vec![
            EventTypeCount {
                event_type: "click".to_string(),
                count: 30
            },
            EventTypeCount {
                event_type: "view".to_string(),
                count: 12
            },
        ]
    );
    assert_eq!(data.unique_users_in_range, 5);

    // Same input, same output
    assert_eq!(dashboard.view().data.unwrap(), data);

    assert_eq!(
        services.date_range_bounds().await[0],
        (
            "2024-01-01T00:00:00".to_string(),
            "2024-01-07T23:59:59".to_string()
        )
    );

    app.shutdown().await;
}

#[tokio::test]
async fn test_login_persists_credential_across_restart() {
    let services = Services::start().await;
    services.mount_login("abc123").await;
    services.mount_analytics().await;

    let temp_dir = TempDir::new().unwrap();
    let config = services.app_config(Duration::from_secs(30));

    let mut app = App::new(config.clone(), session_file(&temp_dir)).unwrap();
    assert!(!app.init().await.unwrap());

    let mut form = AuthForm::new(AuthMode::Login);
    form.username = "ada".to_string();
    form.password = "hunter2".to_string();
    app.submit(&mut form).await.unwrap();
    assert_eq!(app.session().current(), Some(Credential::new("abc123")));
    app.shutdown().await;

    // Durable storage holds the token
    assert_eq!(
        session_file(&temp_dir).load().await.unwrap(),
        Some(Credential::new("abc123"))
    );

    // A fresh session store restores it
    let restored = SessionStore::new(session_file(&temp_dir));
    assert_eq!(restored.restore().await, Some(Credential::new("abc123")));
}

#[tokio::test]
async fn test_register_then_failed_auto_login_commits_nothing() {
    let services = Services::start().await;
    services.mount_analytics().await;

    Mock::given(method("POST"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "username": "ada",
            "email": "ada@example.com"
        })))
        .expect(1)
        .mount(&services.identity)
        .await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "invalid credentials"})),
        )
        .expect(1)
        .mount(&services.identity)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let mut app = App::new(
        services.app_config(Duration::from_secs(30)),
        session_file(&temp_dir),
    )
    .unwrap();
    app.init().await.unwrap();

    let mut form = AuthForm::new(AuthMode::Register);
    form.username = "ada".to_string();
    form.email = "ada@example.com".to_string();
    form.password = "hunter2".to_string();
    assert!(app.submit(&mut form).await.is_err());

    assert_eq!(form.error.as_deref(), Some("invalid credentials"));
    assert!(!app.is_authenticated());
    assert!(app.dashboard().is_none());
    assert!(session_file(&temp_dir).load().await.unwrap().is_none());
    assert_eq!(services.analytics_hits(SUMMARY_PATH).await, 0);
}

#[tokio::test]
async fn test_logout_clears_session_and_stops_polling() {
    let services = Services::start().await;
    services.mount_analytics().await;

    let temp_dir = TempDir::new().unwrap();
    let storage = session_file(&temp_dir);
    storage.save(&Credential::new("abc123")).await.unwrap();

    let mut app = App::new(
        services.app_config(Duration::from_millis(200)),
        storage.clone(),
    )
    .unwrap();
    assert!(app.init().await.unwrap());

    // Let the timer fire a few times
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(services.analytics_hits(SUMMARY_PATH).await >= 2);

    app.logout().await.unwrap();
    assert!(app.dashboard().is_none());
    assert!(storage.load().await.unwrap().is_none());
    assert!(!temp_dir.path().join("session.json").exists());

    let restored = SessionStore::new(session_file(&temp_dir));
    assert!(restored.restore().await.is_none());

    // Let anything already on the wire land before counting
    tokio::time::sleep(Duration::from_millis(100)).await;
    let summary_hits = services.analytics_hits(SUMMARY_PATH).await;
    let by_type_hits = services.analytics_hits(BY_TYPE_PATH).await;
    let range_hits = services.analytics_hits(DATE_RANGE_PATH).await;
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(services.analytics_hits(SUMMARY_PATH).await, summary_hits);
    assert_eq!(services.analytics_hits(BY_TYPE_PATH).await, by_type_hits);
    assert_eq!(services.analytics_hits(DATE_RANGE_PATH).await, range_hits);
}

#[tokio::test]
async fn test_range_edit_refetches_with_full_day_bounds() {
    let services = Services::start().await;
    services.mount_analytics().await;

    let mut config = services.app_config(Duration::from_secs(30));
    config.initial_range = Some(DateRange::new(date(2024, 1, 1), date(2024, 1, 7)));

    let temp_dir = TempDir::new().unwrap();
    let storage = session_file(&temp_dir);
    storage.save(&Credential::new("abc123")).await.unwrap();

    let mut app = App::new(config, storage).unwrap();
    app.init().await.unwrap();

    let dashboard = app.dashboard().unwrap();
    let mut rx = dashboard.subscribe();
    wait_for_snapshot(&mut rx, |s| s.applied_cycle() == Some(1))
        .await
        .expect("mount cycle never completed");

    dashboard.set_range_bound(DateBound::End, date(2024, 1, 31));
    let snapshot = wait_for_snapshot(&mut rx, |s| s.applied_cycle() == Some(2))
        .await
        .expect("range cycle never completed");
    assert_eq!(snapshot.data.unwrap().range.end, date(2024, 1, 31));

    let bounds = services.date_range_bounds().await;
    assert_eq!(bounds.len(), 2);
    assert_eq!(
        bounds[1],
        (
            "2024-01-01T00:00:00".to_string(),
            "2024-01-31T23:59:59".to_string()
        )
    );

    app.shutdown().await;
}

#[tokio::test]
async fn test_service_outage_keeps_last_snapshot() {
    let services = Services::start().await;
    services.mount_analytics().await;

    let temp_dir = TempDir::new().unwrap();
    let storage = session_file(&temp_dir);
    storage.save(&Credential::new("abc123")).await.unwrap();

    let mut app = App::new(services.app_config(Duration::from_secs(30)), storage).unwrap();
    app.init().await.unwrap();

    let dashboard = app.dashboard().unwrap();
    let mut rx = dashboard.subscribe();
    let good = wait_for_snapshot(&mut rx, |s| s.status == PollStatus::Ready)
        .await
        .expect("first cycle never completed");

    // Every endpoint now fails
    services.analytics.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&services.analytics)
        .await;

    dashboard.refresh();
    let failed = wait_for_snapshot(&mut rx, |s| s.status == PollStatus::Error)
        .await
        .expect("failed cycle never reported");

    assert_eq!(failed.data, good.data);
    assert!(failed.error.is_some());
    assert!(good.error.is_none());

    let view = dashboard.view();
    assert!(view.data.is_some());
    assert!(!view.is_initial_load());

    app.shutdown().await;
}
