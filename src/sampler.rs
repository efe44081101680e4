//! Periodic sampling lifecycle.
//!
//! A [`Sampler`] owns at most one background task. The task ticks on a
//! fixed interval, runs one fetch-and-process cycle per tick and publishes
//! the resulting [`MonitorState`] through a watch channel.
//!
//! ```text
//!  tick ──▶ source.fetch() ──▶ normalize() ──▶ MonitorState::ingest()
//!   ▲                                  │              │
//!   │             (error) ─────────────┴──▶ record_failure()
//!   └────────────── interval (missed ticks skipped) ◀─┘
//! ```
//!
//! Every start and stop bumps the state's `generation`. A cycle only
//! writes to the state while holding the channel's lock *and* seeing its own
//! generation, so a fetch that completes after `stop()` is dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::data::{normalize, Ingest, MonitorState, SharedThresholds, ThresholdConfig};
use crate::error::SampleError;
use crate::source::MetricsSource;

/// Default polling interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

/// Shortest interval a [`Sampler`] accepts; smaller values are raised to it.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Result of one cycle, mostly for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new snapshot was appended.
    Appended,
    /// The snapshot repeated the previous one.
    Unchanged,
    /// The fetch or normalization failed.
    Failed,
    /// The lifecycle was stopped or restarted meanwhile; nothing applied.
    Stale,
}

/// Start/stop lifecycle around the periodic sampling task.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use instance_monitor::{HttpSource, Sampler, SharedThresholds, ThresholdConfig};
///
/// # tokio_test::block_on(async {
/// let source = HttpSource::new("http://127.0.0.1:5000/api", std::time::Duration::from_secs(4)).unwrap();
/// let mut sampler = Sampler::new(instance_monitor::sampler::DEFAULT_INTERVAL);
/// let state = sampler.subscribe();
///
/// sampler.start(Arc::new(source), SharedThresholds::new(ThresholdConfig::default()));
/// // ... read `state.borrow()` from the UI ...
/// sampler.stop();
/// # });
/// ```
#[derive(Debug)]
pub struct Sampler {
    interval: Duration,
    state: watch::Sender<MonitorState>,
    thresholds: Option<SharedThresholds>,
    task: Option<JoinHandle<()>>,
}

impl Sampler {
    /// Create an idle sampler.
    ///
    /// Intervals below [`MIN_INTERVAL`] are raised to it.
    pub fn new(interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            warn!("Sampling interval {:?} too short, using {:?}", interval, MIN_INTERVAL);
        }
        let (state, _) = watch::channel(MonitorState::new());
        Self {
            interval: interval.max(MIN_INTERVAL),
            state,
            thresholds: None,
            task: None,
        }
    }

    /// Receive state updates.
    pub fn subscribe(&self) -> watch::Receiver<MonitorState> {
        self.state.subscribe()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True while a sampling task is active.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start sampling `source`, replacing any running lifecycle.
    ///
    /// The previous task is cancelled and the state reset before the new
    /// task is spawned. The first cycle runs immediately. Must be called from
    /// within a Tokio runtime. Returns the new generation.
    pub fn start(&mut self, source: Arc<dyn MetricsSource>, thresholds: SharedThresholds) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let description = source.description().to_string();
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.generation += 1;
            state.reset();
            state.source = Some(description.clone());
            generation = state.generation;
        });

        info!(
            "Starting sampler for {} every {:?} (generation {})",
            description, self.interval, generation
        );

        let state = self.state.clone();
        let period = self.interval;
        let task_thresholds = thresholds.clone();
        self.task = Some(tokio::spawn(async move {
            run(source, task_thresholds, state, generation, period).await;
        }));
        self.thresholds = Some(thresholds);

        generation
    }

    /// Stop sampling and discard all state.
    ///
    /// After this returns no cycle of the stopped lifecycle can modify the
    /// state, even if its fetch was in flight.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.thresholds = None;

        let mut stopped = None;
        self.state.send_modify(|state| {
            stopped = state.source.take();
            state.generation += 1;
            state.reset();
        });

        if let Some(description) = stopped {
            info!("Stopped sampler for {}", description);
        }
    }

    /// Re-evaluate alerts for the latest snapshot against the current
    /// thresholds. Call after changing thresholds.
    pub fn reevaluate(&self) {
        let Some(thresholds) = &self.thresholds else {
            return;
        };
        let config = thresholds.get();
        self.state.send_if_modified(|state| state.reevaluate(&config));
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    source: Arc<dyn MetricsSource>,
    thresholds: SharedThresholds,
    state: watch::Sender<MonitorState>,
    generation: u64,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    // a slow fetch delays the next cycle instead of queueing a burst
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let outcome = run_cycle(source.as_ref(), &thresholds, &state, generation).await;
        if outcome == CycleOutcome::Stale {
            debug!("Sampler generation {} superseded, exiting", generation);
            break;
        }
    }
}

/// Run one fetch-and-process cycle for `generation`.
pub(crate) async fn run_cycle(
    source: &dyn MetricsSource,
    thresholds: &SharedThresholds,
    state: &watch::Sender<MonitorState>,
    generation: u64,
) -> CycleOutcome {
    let started = state.send_if_modified(|s| {
        if s.generation != generation {
            return false;
        }
        s.loading = true;
        true
    });
    if !started {
        return CycleOutcome::Stale;
    }

    let result = match source.fetch().await {
        Ok(payload) => normalize(&payload, Local::now()),
        Err(err) => Err(err),
    };

    let mut outcome = CycleOutcome::Stale;
    state.send_if_modified(|s| {
        if s.generation != generation {
            return false;
        }
        s.loading = false;
        outcome = match result {
            Ok(sample) => match s.ingest(sample, &thresholds.get()) {
                Ingest::Appended => {
                    debug!(
                        "Accepted sample from {} ({} in window)",
                        source.description(),
                        s.history.len()
                    );
                    CycleOutcome::Appended
                }
                Ingest::Unchanged => CycleOutcome::Unchanged,
            },
            Err(err) => {
                warn!(
                    "Sampling {} failed ({:?}): {}",
                    source.description(),
                    err.kind(),
                    err
                );
                s.record_failure(&err);
                CycleOutcome::Failed
            }
        };
        true
    });

    if outcome == CycleOutcome::Stale {
        debug!("Discarding result for stopped generation {}", generation);
    }
    outcome
}

/// Fetch and process a single sample outside of any lifecycle.
///
/// Used for headless exports.
pub async fn collect_once(
    source: &dyn MetricsSource,
    thresholds: &ThresholdConfig,
) -> Result<MonitorState, SampleError> {
    let payload = source.fetch().await?;
    let sample = normalize(&payload, Local::now())?;

    let mut state = MonitorState::new();
    state.source = Some(source.description().to_string());
    state.ingest(sample, thresholds);
    Ok(state)
}
