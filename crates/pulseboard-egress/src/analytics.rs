//! Analytics service client

use crate::client::{HttpClientConfig, create_client, endpoint, read_json};
use crate::{EgressError, Result};
use async_trait::async_trait;
use pulseboard_core::{
    AnalyticsSource, Credential, DateRange, DateRangeAggregate, EventFilter, EventRecord,
    EventTypeCount, Summary,
};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};

/// Analytics service configuration
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Base URL (default: http://localhost:8001)
    pub base_url: String,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            client_config: HttpClientConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Analytics service client.
///
/// Every call is a single attempt: no caching, no retry.
pub struct AnalyticsClient {
    config: AnalyticsConfig,
    client: Client,
    credential: Option<Credential>,
}

impl AnalyticsClient {
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self {
            config,
            client,
            credential: None,
        })
    }

    /// Attach the session's bearer credential to every request
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn get(&self, path_and_query: &str) -> RequestBuilder {
        let url = endpoint(&self.config.base_url, path_and_query);
        debug!("GET {}", url);
        let request = self.client.get(url);
        match &self.credential {
            Some(credential) => request.header("Authorization", credential.bearer_header()),
            None => request,
        }
    }

    /// `GET /analytics/summary`
    #[instrument(skip(self))]
    pub async fn fetch_summary(&self) -> Result<Summary> {
        let response = self.get("/analytics/summary").send().await?;
        read_json(response, "summary").await
    }

    /// `GET /analytics/events/by-type`
    #[instrument(skip(self))]
    pub async fn fetch_events_by_type(&self) -> Result<Vec<EventTypeCount>> {
        let response = self.get("/analytics/events/by-type").send().await?;
        read_json(response, "events by type").await
    }

    /// `GET /analytics/events/date-range` from the first second of `range.start`
    /// to the last second of `range.end`
    #[instrument(skip(self), fields(range = %range))]
    pub async fn fetch_events_in_range(&self, range: &DateRange) -> Result<DateRangeAggregate> {
        let query = serde_urlencoded::to_string(vec![
            ("start_date", range.start_timestamp()),
            ("end_date", range.end_timestamp()),
        ])
        .map_err(|e| EgressError::ConfigError(format!("Failed to encode range: {}", e)))?;

        let response = self
            .get(&format!("/analytics/events/date-range?{}", query))
            .send()
            .await?;
        read_json(response, "events in range").await
    }

    /// `GET /analytics/events`, newest first
    #[instrument(skip(self))]
    pub async fn recent_events(&self, filter: &EventFilter) -> Result<Vec<EventRecord>> {
        let query = serde_urlencoded::to_string(filter)
            .map_err(|e| EgressError::ConfigError(format!("Failed to encode filter: {}", e)))?;

        let path = if query.is_empty() {
            "/analytics/events".to_string()
        } else {
            format!("/analytics/events?{}", query)
        };
        let response = self.get(&path).send().await?;
        read_json(response, "events").await
    }
}

#[async_trait]
impl AnalyticsSource for AnalyticsClient {
    async fn summary(&self) -> pulseboard_core::Result<Summary> {
        Ok(self.fetch_summary().await?)
    }

    async fn events_by_type(&self) -> pulseboard_core::Result<Vec<EventTypeCount>> {
        Ok(self.fetch_events_by_type().await?)
    }

    async fn events_in_range(&self, range: &DateRange) -> pulseboard_core::Result<DateRangeAggregate> {
        Ok(self.fetch_events_in_range(range).await?)
    }
}
