//! Selected date range
//!
//! A thin wrapper over a `watch` channel: the poller holds the receiving end
//! and starts a cycle on every change.

use chrono::NaiveDate;
use pulseboard_core::{DateBound, DateRange};
use tokio::sync::watch;
use tracing::debug;

pub struct DateRangeState {
    tx: watch::Sender<DateRange>,
}

impl DateRangeState {
    pub fn new(initial: DateRange) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> DateRange {
        *self.tx.borrow()
    }

    /// Move one bound, leaving the other as it is.
    ///
    /// No ordering check and no clamping. Subscribers are notified even when
    /// the value is unchanged, so re-selecting a date still refreshes.
    pub fn set(&self, bound: DateBound, value: NaiveDate) -> DateRange {
        self.tx.send_modify(|range| *range = range.with_bound(bound, value));
        let range = self.current();
        debug!(?bound, %range, "Date range updated");
        range
    }

    /// Replace both bounds at once
    pub fn replace(&self, range: DateRange) {
        self.tx.send_replace(range);
        debug!(%range, "Date range replaced");
    }

    pub fn subscribe(&self) -> watch::Receiver<DateRange> {
        self.tx.subscribe()
    }
}

impl Default for DateRangeState {
    fn default() -> Self {
        Self::new(DateRange::last_week())
    }
}
