//! Snapshot model published by the poller and consumed by renderers

use crate::types::{DateRange, DateRangeAggregate, EventTypeCount, Summary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// User-facing message for any failed fetch cycle
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch analytics data";

/// Poller state machine: `Idle -> Loading -> {Ready, Error}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    /// No cycle has been started yet
    Idle,
    /// The most recently started cycle is in flight
    Loading,
    /// The most recently finished cycle succeeded
    Ready,
    /// The most recently finished cycle failed
    Error,
}

/// Everything one successful cycle fetched, replaced wholesale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleData {
    /// Monotonic id of the cycle that produced this data
    pub cycle_id: u64,
    pub fetched_at: DateTime<Utc>,
    /// Range the date-range query was issued with
    pub range: DateRange,
    pub summary: Summary,
    pub event_types: Vec<EventTypeCount>,
    pub date_range: DateRangeAggregate,
}

/// The renderer's view of the analytics state.
///
/// `data` is shared behind an `Arc` and only ever swapped, never mutated, so a
/// reader can never observe fields from two different cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsSnapshot {
    pub status: PollStatus,
    pub error: Option<String>,
    pub data: Option<Arc<CycleData>>,
}

impl AnalyticsSnapshot {
    pub fn idle() -> Self {
        Self {
            status: PollStatus::Idle,
            error: None,
            data: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == PollStatus::Loading
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Nothing has ever loaded and a cycle is running: the renderer shows a
    /// blocking loading screen instead of an empty dashboard.
    pub fn is_initial_load(&self) -> bool {
        self.is_loading() && self.data.is_none()
    }

    /// Id of the cycle whose data is currently published
    pub fn applied_cycle(&self) -> Option<u64> {
        self.data.as_ref().map(|d| d.cycle_id)
    }
}

impl Default for AnalyticsSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}
