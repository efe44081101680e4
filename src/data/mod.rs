//! Data models and processing for sampled metrics.
//!
//! This module turns raw endpoint payloads into the bounded history and
//! chart series the UI draws.
//!
//! ## Submodules
//!
//! - [`snapshot`]: Normalization of raw payloads into [`MetricSnapshot`]s
//! - [`filter`]: Suppression of consecutive duplicate snapshots
//! - [`history`]: The bounded [`HistoryWindow`]
//! - [`thresholds`]: [`ThresholdConfig`], live [`SharedThresholds`] and [`AlertState`]
//! - [`series`]: Per-chart projections and axis ceilings
//! - [`state`]: [`MonitorState`], the per-lifecycle aggregate of all of the above
//! - [`duration`]: Parsing of interval strings ("5s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! payload (raw JSON)
//!        │
//!        ▼
//! snapshot::normalize()
//!        │
//!        ▼
//! ChangeFilter::accept() ──(repeat)──▶ only CurrentTest updated
//!        │
//!        ├──▶ HistoryWindow::append()
//!        │
//!        └──▶ AlertState::evaluate() (current thresholds)
//!                     │
//!                     ▼
//!            ChartSeries::project() (memoized per window revision)
//! ```

pub mod duration;
pub mod filter;
pub mod history;
pub mod series;
pub mod snapshot;
pub mod state;
pub mod thresholds;

pub use filter::ChangeFilter;
pub use history::HistoryWindow;
pub use series::{ChartSeries, IoPoint, NetworkPoint, ResourcePoint, SeriesCache};
pub use snapshot::{normalize, CurrentTest, MetricSnapshot, Sample};
pub use state::{CycleStats, Ingest, MonitorState};
pub use thresholds::{AlertState, MetricKey, SharedThresholds, ThresholdConfig, ThresholdField};
