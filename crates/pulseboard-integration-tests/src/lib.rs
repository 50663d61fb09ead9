//! End-to-end test fixtures for Pulseboard
//!
//! Stands up mocked identity and analytics services and wires an `App` to
//! them, so the tests under `tests/` exercise the full path from form
//! submission through the poller to the rendered view model.

use pulseboard_app::AppConfig;
use pulseboard_core::AnalyticsSnapshot;
use pulseboard_egress::{AnalyticsConfig, IdentityConfig};
use pulseboard_sync::PollerConfig;
use serde_json::json;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const SUMMARY_PATH: &str = "/analytics/summary";
pub const BY_TYPE_PATH: &str = "/analytics/events/by-type";
pub const DATE_RANGE_PATH: &str = "/analytics/events/date-range";

/// The two upstream services
pub struct Services {
    pub identity: MockServer,
    pub analytics: MockServer,
}

impl Services {
    pub async fn start() -> Self {
        Self {
            identity: MockServer::start().await,
            analytics: MockServer::start().await,
        }
    }

    /// Healthy analytics responses: two event types, and a week with 42
    /// events from 5 users
    pub async fn mount_analytics(&self) {
        Mock::given(method("GET"))
            .and(path(SUMMARY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_users": 12,
                "active_users_24h": 3,
                "total_events": 250,
                "event_type_counts": {"click": 200, "view": 50}
            })))
            .mount(&self.analytics)
            .await;

        Mock::given(method("GET"))
            .and(path(BY_TYPE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"event_type": "click", "count": 200},
                {"event_type": "view", "count": 50}
            ])))
            .mount(&self.analytics)
            .await;

        Mock::given(method("GET"))
            .and(path(DATE_RANGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "start_date": "2024-01-01T00:00:00",
                "end_date": "2024-01-07T23:59:59",
                "total_events": 42,
                "unique_users": 5,
                "event_breakdown": {"view": 12, "click": 30}
            })))
            .mount(&self.analytics)
            .await;
    }

    /// Sign-in succeeds with the given token
    pub async fn mount_login(&self, token: &str) {
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": token,
                "token_type": "bearer"
            })))
            .mount(&self.identity)
            .await;
    }

    pub fn app_config(&self, poll_interval: Duration) -> AppConfig {
        AppConfig {
            identity: IdentityConfig::new(self.identity.uri()),
            analytics: AnalyticsConfig::new(self.analytics.uri()),
            poller: PollerConfig::new(poll_interval).expect("poll interval must be non-zero"),
            initial_range: None,
        }
    }

    /// Number of requests the analytics service has seen on `request_path`
    pub async fn analytics_hits(&self, request_path: &str) -> usize {
        self.analytics
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == request_path)
            .count()
    }

    /// `(start_date, end_date)` of every date-range request, oldest first
    pub async fn date_range_bounds(&self) -> Vec<(String, String)> {
        self.analytics
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == DATE_RANGE_PATH)
            .map(|request| {
                let param = |name: &str| {
                    request
                        .url
                        .query_pairs()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| value.into_owned())
                        .unwrap_or_default()
                };
                (param("start_date"), param("end_date"))
            })
            .collect()
    }
}

/// Wait (up to five seconds) for a snapshot matching `ready`
pub async fn wait_for_snapshot(
    rx: &mut watch::Receiver<AnalyticsSnapshot>,
    ready: impl FnMut(&AnalyticsSnapshot) -> bool,
) -> Option<AnalyticsSnapshot> {
    let waited = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(ready)).await;
    match waited {
        Ok(Ok(snapshot)) => Some((*snapshot).clone()),
        _ => None,
    }
}
