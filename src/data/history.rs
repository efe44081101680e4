//! Bounded recent-history window backing every chart.

use std::collections::VecDeque;

use super::snapshot::MetricSnapshot;

/// Number of older samples kept alongside the newest one.
pub const RETAINED_HISTORY: usize = 20;

/// Ordered, size-bounded sequence of accepted snapshots.
///
/// Appends go to the tail and evict from the head, so the window is always
/// chronological. It holds at most [`RETAINED_HISTORY`] older entries plus
/// the newest, i.e. `capacity()` entries.
///
/// Every mutation bumps [`revision`](Self::revision), which projections use
/// as the window's identity.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    entries: VecDeque<MetricSnapshot>,
    retained: usize,
    revision: u64,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryWindow {
    /// Create an empty window with the default retention.
    pub fn new() -> Self {
        Self::with_retained(RETAINED_HISTORY)
    }

    /// Create an empty window that keeps `retained` older samples.
    pub fn with_retained(retained: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(retained + 1),
            retained,
            revision: 0,
        }
    }

    /// Maximum number of entries ever held.
    pub fn capacity(&self) -> usize {
        self.retained + 1
    }

    /// Append a snapshot, evicting the oldest entries past capacity.
    pub fn append(&mut self, snapshot: MetricSnapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity() {
            self.entries.pop_front();
        }
        self.revision += 1;
    }

    /// The full ordered sequence, oldest first.
    pub fn snapshot_all(&self) -> Vec<MetricSnapshot> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricSnapshot> {
        self.entries.iter()
    }

    /// The most recently appended snapshot.
    pub fn latest(&self) -> Option<&MetricSnapshot> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.revision += 1;
    }
}
