//! Monitor state for one sampling lifecycle.

use std::time::Instant;

use crate::error::SampleError;

use super::filter::ChangeFilter;
use super::history::HistoryWindow;
use super::snapshot::{CurrentTest, Sample};
use super::thresholds::{AlertState, ThresholdConfig};

/// What happened to a sample handed to [`MonitorState::ingest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    /// The snapshot differed from the previous one and was appended.
    Appended,
    /// The snapshot repeated the previous one; only the current test changed.
    Unchanged,
}

/// Counters for the status bar and exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub accepted: u64,
    pub unchanged: u64,
    pub failed: u64,
}

/// Everything the sampler pipeline maintains for the active target.
///
/// The window, alerts and current test are only ever touched by
/// [`ingest`](Self::ingest); a failed cycle goes through
/// [`record_failure`](Self::record_failure), which leaves them alone.
#[derive(Debug, Clone)]
pub struct MonitorState {
    /// Lifecycle this state belongs to. Bumped by every start and stop.
    pub generation: u64,
    /// Description of the active source, if any.
    pub source: Option<String>,
    pub history: HistoryWindow,
    filter: ChangeFilter,
    pub alerts: AlertState,
    pub current_test: CurrentTest,
    /// A fetch is in flight.
    pub loading: bool,
    /// Message of the most recent failed cycle, cleared by the next success.
    pub last_error: Option<String>,
    /// When the last sample was accepted.
    pub last_updated: Option<Instant>,
    pub stats: CycleStats,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorState {
    pub fn new() -> Self {
        Self {
            generation: 0,
            source: None,
            history: HistoryWindow::new(),
            filter: ChangeFilter::new(),
            alerts: AlertState::default(),
            current_test: CurrentTest::default(),
            loading: false,
            last_error: None,
            last_updated: None,
            stats: CycleStats::default(),
        }
    }

    /// Apply a successfully fetched sample.
    pub fn ingest(&mut self, sample: Sample, thresholds: &ThresholdConfig) -> Ingest {
        let Sample {
            snapshot,
            current_test,
        } = sample;

        self.current_test = current_test;
        self.last_error = None;

        if !self.filter.accept(&snapshot) {
            self.stats.unchanged += 1;
            return Ingest::Unchanged;
        }

        self.alerts = AlertState::evaluate(&snapshot, thresholds);
        self.history.append(snapshot);
        self.last_updated = Some(Instant::now());
        self.stats.accepted += 1;
        Ingest::Appended
    }

    /// Record a failed cycle without touching window, alerts or current test.
    pub fn record_failure(&mut self, err: &SampleError) {
        self.last_error = Some(err.to_string());
        self.stats.failed += 1;
    }

    /// Re-evaluate alerts for the latest snapshot, e.g. after a threshold
    /// change. Returns true if the alert set changed.
    pub fn reevaluate(&mut self, thresholds: &ThresholdConfig) -> bool {
        let alerts = match self.history.latest() {
            Some(latest) => AlertState::evaluate(latest, thresholds),
            None => AlertState::default(),
        };
        let changed = alerts != self.alerts;
        self.alerts = alerts;
        changed
    }

    /// Forget everything except the generation counter.
    pub fn reset(&mut self) {
        let generation = self.generation;
        *self = Self::new();
        self.generation = generation;
    }

    /// True once at least one sample was accepted.
    pub fn has_data(&self) -> bool {
        !self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::snapshot::MetricSnapshot;
    use crate::data::thresholds::MetricKey;

    fn sample(time: &str, cpu: f64, test: &str) -> Sample {
        Sample {
            snapshot: MetricSnapshot {
                time: time.to_string(),
                cpu,
                ..MetricSnapshot::default()
            },
            current_test: CurrentTest {
                kind: test.to_string(),
                duration: 10.0,
            },
        }
    }

    #[test]
    fn test_ingest_appends_and_evaluates() {
        let mut state = MonitorState::new();
        let outcome = state.ingest(sample("10:00:00", 95.0, "cpu"), &ThresholdConfig::default());

        assert_eq!(outcome, Ingest::Appended);
        assert_eq!(state.history.len(), 1);
        assert!(state.alerts.is_breached(MetricKey::Cpu));
        assert_eq!(state.current_test.kind, "cpu");
        assert!(state.has_data());
        assert!(state.last_updated.is_some());
    }

    #[test]
    fn test_identical_metrics_with_new_time_are_both_appended() {
        let mut state = MonitorState::new();
        let thresholds = ThresholdConfig::default();

        state.ingest(sample("10:00:00", 20.0, "idle"), &thresholds);
        let outcome = state.ingest(sample("10:00:05", 20.0, "idle"), &thresholds);

        assert_eq!(outcome, Ingest::Appended);
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.stats.unchanged, 0);
    }

    #[test]
    fn test_exact_repeat_still_updates_current_test() {
        let mut state = MonitorState::new();
        let thresholds = ThresholdConfig::default();

        state.ingest(sample("10:00:00", 95.0, "first"), &thresholds);
        let revision = state.history.revision();

        // thresholds moved, but an unchanged snapshot must not re-evaluate
        let relaxed = ThresholdConfig {
            cpu: 99.0,
            ..thresholds
        };
        let outcome = state.ingest(sample("10:00:00", 95.0, "second"), &relaxed);

        assert_eq!(outcome, Ingest::Unchanged);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history.revision(), revision);
        assert!(state.alerts.is_breached(MetricKey::Cpu));
        assert_eq!(state.current_test.kind, "second");
    }

    #[test]
    fn test_failure_leaves_pipeline_state_alone() {
        let mut state = MonitorState::new();
        state.ingest(sample("10:00:00", 95.0, "cpu"), &ThresholdConfig::default());
        let history = state.history.snapshot_all();
        let alerts = state.alerts.clone();
        let current_test = state.current_test.clone();

        state.record_failure(&SampleError::Timeout);

        assert_eq!(state.history.snapshot_all(), history);
        assert_eq!(state.alerts, alerts);
        assert_eq!(state.current_test, current_test);
        assert_eq!(state.last_error.as_deref(), Some("Request timed out"));
        assert_eq!(state.stats.failed, 1);
    }

    #[test]
    fn test_success_clears_last_error() {
        let mut state = MonitorState::new();
        state.record_failure(&SampleError::Status(500));
        state.ingest(sample("10:00:00", 1.0, "x"), &ThresholdConfig::default());
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_reevaluate_uses_latest_snapshot() {
        let mut state = MonitorState::new();
        state.ingest(sample("10:00:00", 70.0, "x"), &ThresholdConfig::default());
        assert!(state.alerts.is_empty());

        let strict = ThresholdConfig {
            cpu: 60.0,
            ..ThresholdConfig::default()
        };
        assert!(state.reevaluate(&strict));
        assert!(state.alerts.is_breached(MetricKey::Cpu));
        assert!(!state.reevaluate(&strict));
    }

    #[test]
    fn test_reset_keeps_generation() {
        let mut state = MonitorState::new();
        state.generation = 7;
        state.source = Some("http://example".to_string());
        state.ingest(sample("10:00:00", 70.0, "x"), &ThresholdConfig::default());

        state.reset();

        assert_eq!(state.generation, 7);
        assert!(state.source.is_none());
        assert!(!state.has_data());
        assert_eq!(state.current_test, CurrentTest::default());
    }
}
