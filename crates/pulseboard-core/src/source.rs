//! Analytics source trait definitions

use crate::{
    Result,
    types::{DateRange, DateRangeAggregate, EventTypeCount, Summary},
};

/// The three reads a fetch cycle is made of.
///
/// Each call is a single attempt; callers decide what a failure means.
#[async_trait::async_trait]
pub trait AnalyticsSource: Send + Sync {
    /// `GET /analytics/summary`
    async fn summary(&self) -> Result<Summary>;

    /// `GET /analytics/events/by-type`
    async fn events_by_type(&self) -> Result<Vec<EventTypeCount>>;

    /// `GET /analytics/events/date-range` over the full days of `range`
    async fn events_in_range(&self, range: &DateRange) -> Result<DateRangeAggregate>;
}
