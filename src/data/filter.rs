//! Suppression of consecutive duplicate snapshots.

use super::snapshot::MetricSnapshot;

/// Remembers the last accepted snapshot and rejects exact repeats.
///
/// Equality covers every field, `time` included. Since the time string
/// advances every second this only suppresses samples normalized within
/// the same second with identical metrics.
#[derive(Debug, Clone, Default)]
pub struct ChangeFilter {
    last_accepted: Option<MetricSnapshot>,
}

impl ChangeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records `snapshot` if it differs from the last
    /// accepted one.
    pub fn accept(&mut self, snapshot: &MetricSnapshot) -> bool {
        if self.last_accepted.as_ref() == Some(snapshot) {
            return false;
        }
        self.last_accepted = Some(snapshot.clone());
        true
    }

    pub fn last_accepted(&self) -> Option<&MetricSnapshot> {
        self.last_accepted.as_ref()
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(time: &str, cpu: f64) -> MetricSnapshot {
        MetricSnapshot {
            time: time.to_string(),
            cpu,
            ..MetricSnapshot::default()
        }
    }

    #[test]
    fn test_first_snapshot_is_accepted() {
        let mut filter = ChangeFilter::new();
        assert!(filter.accept(&snap("10:00:00", 5.0)));
        assert_eq!(filter.last_accepted().unwrap().cpu, 5.0);
    }

    #[test]
    fn test_exact_repeat_is_rejected() {
        let mut filter = ChangeFilter::new();
        assert!(filter.accept(&snap("10:00:00", 5.0)));
        assert!(!filter.accept(&snap("10:00:00", 5.0)));
    }

    #[test]
    fn test_same_metrics_new_time_passes() {
        let mut filter = ChangeFilter::new();
        assert!(filter.accept(&snap("10:00:00", 5.0)));
        assert!(filter.accept(&snap("10:00:05", 5.0)));
        assert_eq!(filter.last_accepted().unwrap().time, "10:00:05");
    }

    #[test]
    fn test_reset_forgets_reference() {
        let mut filter = ChangeFilter::new();
        filter.accept(&snap("10:00:00", 5.0));
        filter.reset();
        assert!(filter.last_accepted().is_none());
        assert!(filter.accept(&snap("10:00:00", 5.0)));
    }
}
