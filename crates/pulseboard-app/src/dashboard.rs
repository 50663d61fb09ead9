//! The signed-in view
//!
//! A dashboard pairs a date range with the poller that keeps the snapshot
//! for it fresh. It exists only while a session does: the app starts one on
//! sign-in and stops it on sign-out.

use chrono::{DateTime, NaiveDate, Utc};
use pulseboard_core::{
    AnalyticsSnapshot, AnalyticsSource, DashboardData, DateBound, DateRange, PollStatus,
};
use pulseboard_sync::{AnalyticsPoller, DateRangeState, PollerConfig, PollerHandle};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// What a renderer draws for the dashboard at one moment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub range: DateRange,
    pub status: PollStatus,
    pub error: Option<String>,
    /// Derived from the last successful cycle, kept across failures
    pub data: Option<DashboardData>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl DashboardView {
    pub fn from_snapshot(range: DateRange, snapshot: &AnalyticsSnapshot) -> Self {
        Self {
            range,
            status: snapshot.status,
            error: snapshot.error.clone(),
            data: snapshot.data.as_deref().map(DashboardData::from_cycle),
            fetched_at: snapshot.data.as_ref().map(|d| d.fetched_at),
        }
    }

    /// Nothing to show yet: render a blocking loading screen
    pub fn is_initial_load(&self) -> bool {
        self.data.is_none() && matches!(self.status, PollStatus::Idle | PollStatus::Loading)
    }

    pub fn is_refreshing(&self) -> bool {
        self.status == PollStatus::Loading
    }
}

pub struct Dashboard {
    range: DateRangeState,
    poller: PollerHandle,
}

impl Dashboard {
    /// Mount with the default range (the last seven days)
    pub fn start(source: Arc<dyn AnalyticsSource>, config: PollerConfig) -> Self {
        Self::start_with_range(source, config, DateRange::last_week())
    }

    pub fn start_with_range(
        source: Arc<dyn AnalyticsSource>,
        config: PollerConfig,
        initial: DateRange,
    ) -> Self {
        info!(range = %initial, "Mounting dashboard");
        let range = DateRangeState::new(initial);
        let poller = AnalyticsPoller::new(source, config).spawn(range.subscribe());
        Self { range, poller }
    }

    pub fn range(&self) -> DateRange {
        self.range.current()
    }

    /// Move one bound; the poller refetches for the new range right away
    pub fn set_range_bound(&self, bound: DateBound, value: NaiveDate) -> DateRange {
        self.range.set(bound, value)
    }

    pub fn refresh(&self) -> bool {
        self.poller.refresh()
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        self.poller.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalyticsSnapshot> {
        self.poller.subscribe()
    }

    pub fn view(&self) -> DashboardView {
        DashboardView::from_snapshot(self.range(), &self.snapshot())
    }

    /// Stop polling and wait for the poller to wind down
    pub async fn stop(self) {
        self.poller.shutdown().await;
        info!("Dashboard unmounted");
    }
}
