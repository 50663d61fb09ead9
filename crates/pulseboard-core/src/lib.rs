//! Pulseboard Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout Pulseboard:
//! - Typed payload schemas for the identity and analytics services
//! - The snapshot model published to renderers
//! - Pure transforms from payloads to chart/table shapes
//! - The analytics source trait the poller fetches through
//! - Core error types

pub mod error;
pub mod snapshot;
pub mod source;
pub mod transform;
pub mod types;

pub use error::{Error, Result};
pub use snapshot::{AnalyticsSnapshot, CycleData, FETCH_FAILED_MESSAGE, PollStatus};
pub use source::AnalyticsSource;
pub use transform::DashboardData;
pub use types::{
    Credential, CurrentUser, DateBound, DateRange, DateRangeAggregate, EventRecord, EventFilter,
    EventTypeCount, Summary,
};
