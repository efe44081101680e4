//! Per-chart projections of the history window.
//!
//! Three chart groups are derived from the same window, each selecting a
//! disjoint subset of fields. The two groups without a natural upper bound
//! (I/O megabytes and socket counts) get a dynamic axis ceiling.

use serde::Serialize;

use super::history::HistoryWindow;
use super::snapshot::MetricSnapshot;

/// Fixed ceiling for the percent-based resource chart.
pub const RESOURCE_CEILING: f64 = 100.0;

/// Ceiling used when there is nothing to scale against.
pub const EMPTY_CEILING: f64 = 100.0;

/// Headroom multiplier applied to the largest observed value.
pub const CEILING_HEADROOM: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourcePoint {
    pub time: String,
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IoPoint {
    pub time: String,
    pub io_in: f64,
    pub io_out: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkPoint {
    pub time: String,
    pub network_in: u64,
    pub network_out: u64,
}

/// All three chart groups plus their axis ceilings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub resources: Vec<ResourcePoint>,
    pub io: Vec<IoPoint>,
    pub network: Vec<NetworkPoint>,
    pub resource_ceiling: f64,
    pub io_ceiling: f64,
    pub network_ceiling: f64,
}

impl ChartSeries {
    /// Project an ordered sequence of snapshots.
    pub fn project<'a>(snapshots: impl IntoIterator<Item = &'a MetricSnapshot>) -> Self {
        let mut resources = Vec::new();
        let mut io = Vec::new();
        let mut network = Vec::new();

        for s in snapshots {
            resources.push(ResourcePoint {
                time: s.time.clone(),
                cpu: s.cpu,
                memory: s.memory,
                disk: s.disk,
            });
            io.push(IoPoint {
                time: s.time.clone(),
                io_in: s.io_in,
                io_out: s.io_out,
            });
            network.push(NetworkPoint {
                time: s.time.clone(),
                network_in: s.network_in,
                network_out: s.network_out,
            });
        }

        let io_ceiling = axis_ceiling(io.iter().flat_map(|p| [p.io_in, p.io_out]));
        let network_ceiling = axis_ceiling(
            network.iter().flat_map(|p| [p.network_in as f64, p.network_out as f64]),
        );

        Self {
            resources,
            io,
            network,
            resource_ceiling: RESOURCE_CEILING,
            io_ceiling,
            network_ceiling,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for ChartSeries {
    fn default() -> Self {
        Self::project(std::iter::empty())
    }
}

/// `max(values) * 1.5`, or [`EMPTY_CEILING`] when there are no values.
///
/// An all-zero window yields a ceiling of zero; callers drawing an axis
/// must clamp it themselves.
pub fn axis_ceiling(values: impl IntoIterator<Item = f64>) -> f64 {
    values
        .into_iter()
        .reduce(f64::max)
        .map_or(EMPTY_CEILING, |max| max * CEILING_HEADROOM)
}

/// Identity of a window contents: lifecycle generation plus revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowId {
    pub generation: u64,
    pub revision: u64,
}

/// Memoizes the projection of the most recently seen window.
#[derive(Debug, Default)]
pub struct SeriesCache {
    id: Option<WindowId>,
    series: ChartSeries,
    projections: u64,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the projection for `window`, recomputing only when its
    /// identity changed.
    pub fn get(&mut self, generation: u64, window: &HistoryWindow) -> &ChartSeries {
        let id = WindowId {
            generation,
            revision: window.revision(),
        };

        if self.id != Some(id) {
            self.series = ChartSeries::project(window.iter());
            self.id = Some(id);
            self.projections += 1;
        }

        &self.series
    }

    /// The most recently computed projection, without checking freshness.
    pub fn current(&self) -> &ChartSeries {
        &self.series
    }

    /// Number of projections computed so far.
    pub fn projections(&self) -> u64 {
        self.projections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_snap(time: &str, io_in: f64, io_out: f64) -> MetricSnapshot {
        MetricSnapshot {
            time: time.to_string(),
            io_in,
            io_out,
            ..MetricSnapshot::default()
        }
    }

    #[test]
    fn test_empty_window_uses_fallback_ceilings() {
        let series = ChartSeries::project(std::iter::empty());
        assert!(series.is_empty());
        assert_eq!(series.io_ceiling, 100.0);
        assert_eq!(series.network_ceiling, 100.0);
        assert_eq!(series.resource_ceiling, 100.0);
    }

    #[test]
    fn test_io_ceiling_uses_both_series() {
        let window = vec![
            io_snap("a", 10.0, 30.0),
            io_snap("b", 20.0, 0.0),
            io_snap("c", 5.0, 0.0),
        ];
        let series = ChartSeries::project(&window);
        assert_eq!(series.io_ceiling, 45.0);
    }

    #[test]
    fn test_network_ceiling() {
        let window = vec![MetricSnapshot {
            network_in: 40,
            network_out: 12,
            ..MetricSnapshot::default()
        }];
        let series = ChartSeries::project(&window);
        assert_eq!(series.network_ceiling, 60.0);
    }

    #[test]
    fn test_all_zero_window_has_zero_ceiling() {
        let window = vec![io_snap("a", 0.0, 0.0)];
        assert_eq!(ChartSeries::project(&window).io_ceiling, 0.0);
    }

    #[test]
    fn test_projection_selects_fields() {
        let snapshot = MetricSnapshot {
            time: "09:15:00".to_string(),
            cpu: 1.0,
            memory: 2.0,
            disk: 3.0,
            io_in: 4.0,
            io_out: 5.0,
            network_in: 6,
            network_out: 7,
        };
        let series = ChartSeries::project([&snapshot]);

        assert_eq!(
            series.resources,
            vec![ResourcePoint {
                time: "09:15:00".to_string(),
                cpu: 1.0,
                memory: 2.0,
                disk: 3.0
            }]
        );
        assert_eq!(series.io[0].io_out, 5.0);
        assert_eq!(series.network[0].network_in, 6);
        assert_eq!(series.network[0].time, "09:15:00");
    }

    #[test]
    fn test_cache_recomputes_only_on_change() {
        let mut window = HistoryWindow::new();
        window.append(io_snap("a", 1.0, 1.0));

        let mut cache = SeriesCache::new();
        assert_eq!(cache.get(1, &window).io.len(), 1);
        assert_eq!(cache.get(1, &window).io.len(), 1);
        assert_eq!(cache.projections(), 1);

        window.append(io_snap("b", 2.0, 2.0));
        assert_eq!(cache.get(1, &window).io.len(), 2);
        assert_eq!(cache.projections(), 2);

        // a new lifecycle with a coincidentally equal revision still recomputes
        assert_eq!(cache.get(2, &window).io.len(), 2);
        assert_eq!(cache.projections(), 3);
    }
}
