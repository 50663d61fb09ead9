//! Pulseboard Sync
//!
//! Keeps the analytics snapshot fresh:
//! - `DateRangeState`: the selected range; every edit is a refresh trigger
//! - `AnalyticsPoller`: the fetch-cycle state machine driven by a recurring
//!   timer, range edits and manual refreshes

pub mod date_range;
pub mod poller;

pub use date_range::DateRangeState;
pub use poller::{AnalyticsPoller, PollerConfig, PollerHandle, Trigger};
