//! Analytics poller
//!
//! One background task owns the fetch-cycle state machine. It starts a cycle
//! when the dashboard mounts, on every timer tick, whenever the selected date
//! range changes and on manual refresh. A cycle issues the three reads
//! concurrently and either replaces the published data wholesale or, on any
//! failure, keeps the previous data and raises the error flag.
//!
//! Cycles are never cancelled when a newer one starts. Each gets a monotonic
//! id instead, and a result older than the newest finished cycle is dropped,
//! whether that newer cycle succeeded or failed. A slow response for an old
//! range can never overwrite a newer outcome.
//!
//! A range change starts a cycle right away but does not restart the timer;
//! the periodic phase is fixed when the poller is spawned.

use chrono::Utc;
use pulseboard_core::{
    AnalyticsSnapshot, AnalyticsSource, CycleData, DateRange, Error, FETCH_FAILED_MESSAGE,
    PollStatus,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Refresh cadence while the dashboard is open
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PollerConfig {
    interval: Duration,
}

impl PollerConfig {
    /// Fails on a zero interval, which the timer cannot run with
    pub fn new(interval: Duration) -> Result<Self, Error> {
        if interval.is_zero() {
            return Err(Error::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(Self { interval })
    }

    pub fn from_secs(secs: u64) -> Result<Self, Error> {
        Self::new(Duration::from_secs(secs))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// What started a fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Mount,
    Timer,
    RangeChanged,
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::Mount => "mount",
            Trigger::Timer => "timer",
            Trigger::RangeChanged => "range_changed",
            Trigger::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// Result of one cycle, tagged with the cycle that produced it
#[derive(Debug)]
struct CycleOutcome {
    cycle_id: u64,
    result: Result<CycleData, Error>,
}

/// Cycle id bookkeeping. Ids start at 1; `settled` is the newest cycle that
/// has finished, successfully or not, and is 0 until the first one does.
#[derive(Debug, Default)]
struct CycleTracker {
    started: u64,
    settled: u64,
}

impl CycleTracker {
    fn begin(&mut self) -> u64 {
        self.started += 1;
        self.started
    }

    fn is_latest(&self, cycle_id: u64) -> bool {
        cycle_id == self.started
    }

    /// A newer cycle has already finished
    fn is_superseded(&self, cycle_id: u64) -> bool {
        cycle_id < self.settled
    }

    fn mark_started(&self, snapshot: &mut AnalyticsSnapshot) -> bool {
        if snapshot.status == PollStatus::Loading {
            return false;
        }
        snapshot.status = PollStatus::Loading;
        true
    }

    /// Fold a finished cycle into the snapshot. Returns whether the snapshot
    /// changed.
    fn apply(&mut self, outcome: CycleOutcome, snapshot: &mut AnalyticsSnapshot) -> bool {
        let cycle_id = outcome.cycle_id;
        let is_latest = self.is_latest(cycle_id);

        if self.is_superseded(cycle_id) {
            debug!(cycle_id, settled = self.settled, "Dropping superseded cycle result");
            return false;
        }
        self.settled = cycle_id;

        match outcome.result {
            Ok(data) => {
                snapshot.data = Some(Arc::new(data));
                snapshot.error = None;
                if is_latest {
                    snapshot.status = PollStatus::Ready;
                }
                debug!(cycle_id, "Applied cycle result");
            }
            Err(e) => {
                warn!(cycle_id, "Analytics fetch failed: {}", e);
                snapshot.error = Some(FETCH_FAILED_MESSAGE.to_string());
                if is_latest {
                    snapshot.status = PollStatus::Error;
                }
            }
        }
        true
    }

    /// A cycle task died without reporting. Only the status is touched, and
    /// only once nothing else is in flight.
    fn abandon(&self, err: JoinError, in_flight: usize, snapshot: &mut AnalyticsSnapshot) -> bool {
        error!("Fetch cycle task failed: {}", err);
        if in_flight > 0 || snapshot.status != PollStatus::Loading {
            return false;
        }
        snapshot.status = PollStatus::Error;
        snapshot.error = Some(FETCH_FAILED_MESSAGE.to_string());
        true
    }
}

/// Run the three reads of one cycle concurrently.
///
/// The cycle succeeds only if all three do; the first error in request order
/// is reported otherwise. Nothing is retried.
async fn fetch_cycle(
    source: Arc<dyn AnalyticsSource>,
    cycle_id: u64,
    range: DateRange,
) -> CycleOutcome {
    let (summary, event_types, date_range) = tokio::join!(
        source.summary(),
        source.events_by_type(),
        source.events_in_range(&range)
    );

    let result = match (summary, event_types, date_range) {
        (Ok(summary), Ok(event_types), Ok(date_range)) => Ok(CycleData {
            cycle_id,
            fetched_at: Utc::now(),
            range,
            summary,
            event_types,
            date_range,
        }),
        (summary, event_types, date_range) => Err(summary
            .err()
            .or(event_types.err())
            .or(date_range.err())
            .unwrap_or_else(|| Error::Internal("cycle failed without an error".to_string()))),
    };

    CycleOutcome { cycle_id, result }
}

/// Builder for the background polling task
pub struct AnalyticsPoller {
    source: Arc<dyn AnalyticsSource>,
    config: PollerConfig,
}

impl AnalyticsPoller {
    pub fn new(source: Arc<dyn AnalyticsSource>, config: PollerConfig) -> Self {
        Self { source, config }
    }

    /// Start polling. The mount cycle begins immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self, range: watch::Receiver<DateRange>) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel::<()>();
        let (snapshot_tx, snapshot_rx) = watch::channel(AnalyticsSnapshot::idle());

        let task = tokio::spawn(self.run(range, shutdown_rx, refresh_rx, snapshot_tx));

        PollerHandle {
            shutdown_tx,
            refresh_tx,
            snapshot_rx,
            task: Some(task),
        }
    }

    async fn run(
        self,
        mut range_rx: watch::Receiver<DateRange>,
        mut shutdown_rx: mpsc::Receiver<()>,
        mut refresh_rx: mpsc::UnboundedReceiver<()>,
        snapshot_tx: watch::Sender<AnalyticsSnapshot>,
    ) {
        info!(
            "Starting analytics poller (interval: {:?})",
            self.config.interval
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut tracker = CycleTracker::default();
        let mut in_flight: JoinSet<CycleOutcome> = JoinSet::new();
        let mut range_open = true;
        let mut mounted = false;

        loop {
            let trigger = tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    info!("Analytics poller shutting down");
                    break;
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    let remaining = in_flight.len();
                    snapshot_tx.send_if_modified(|snapshot| match joined {
                        Ok(outcome) => tracker.apply(outcome, snapshot),
                        Err(e) => tracker.abandon(e, remaining, snapshot),
                    });
                    continue;
                }
                changed = range_rx.changed(), if range_open => {
                    if changed.is_err() {
                        // Range owner is gone; keep polling the last value
                        range_open = false;
                        continue;
                    }
                    Trigger::RangeChanged
                }
                Some(()) = refresh_rx.recv() => Trigger::Manual,
                _ = ticker.tick() => {
                    if mounted {
                        Trigger::Timer
                    } else {
                        mounted = true;
                        Trigger::Mount
                    }
                }
            };

            let range = *range_rx.borrow_and_update();
            let cycle_id = tracker.begin();
            debug!(cycle_id, %trigger, %range, "Starting fetch cycle");

            snapshot_tx.send_if_modified(|snapshot| tracker.mark_started(snapshot));
            in_flight.spawn(fetch_cycle(Arc::clone(&self.source), cycle_id, range));
        }

        // Outstanding cycles are aborted; their results are never applied
        in_flight.shutdown().await;
    }
}

/// Handle to a running poller.
///
/// Dropping the handle aborts the task; `shutdown` stops it and waits until
/// no request can be issued any more.
pub struct PollerHandle {
    shutdown_tx: mpsc::Sender<()>,
    refresh_tx: mpsc::UnboundedSender<()>,
    snapshot_rx: watch::Receiver<AnalyticsSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Start a cycle now. Returns false once the poller has stopped.
    pub fn refresh(&self) -> bool {
        self.refresh_tx.send(()).is_ok()
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalyticsSnapshot> {
        self.snapshot_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signal the poller to stop and wait for it to finish
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Analytics poller exited abnormally: {}", e);
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
