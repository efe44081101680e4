//! # instance-monitor
//!
//! A terminal dashboard and library for watching remote machines that expose
//! a JSON metrics endpoint.
//!
//! The endpoint is polled on a fixed interval. Each payload is flattened into
//! a typed snapshot, repeated snapshots are dropped, and the rest land in a
//! short rolling window. The newest snapshot is checked against adjustable
//! thresholds, and the window is projected into three bar charts.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (state) │    │(window,  │    │(charts) │    │          │  │
//! │  └────┬────┘    │ alerts)  │    └─────────┘    └──────────┘  │
//! │       │         └────▲─────┘                                 │
//! │       ▼              │ watch channel                         │
//! │  ┌─────────┐    ┌────┴─────┐                                 │
//! │  │ source  │◀───│ sampler  │ (one task per target)           │
//! │  └─────────┘    └──────────┘                                 │
//! │   HttpSource | FileSource | ChannelSource                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`sampler`]**: start/stop lifecycle around the periodic fetch task
//! - **[`source`]**: the [`MetricsSource`] trait with HTTP, file and channel
//!   implementations
//! - **[`data`]**: normalization, change filtering, the history window,
//!   threshold evaluation and chart projection
//! - **[`app`]**, **[`events`]**, **[`ui`]**: the terminal dashboard
//! - **[`settings`]**: layered configuration
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the default endpoint (http://127.0.0.1:5000/api)
//! instance-monitor
//!
//! # Several instances, switch with `i`
//! instance-monitor --instance edge=http://10.0.0.1:5000/api \
//!                  --instance core=http://10.0.0.2:5000/api
//!
//! # One headless sample written as JSON
//! instance-monitor --export dashboard.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use instance_monitor::{HttpSource, Sampler, SharedThresholds, ThresholdConfig};
//!
//! # tokio_test::block_on(async {
//! let source = HttpSource::new("http://127.0.0.1:5000/api", std::time::Duration::from_secs(4)).unwrap();
//! let thresholds = SharedThresholds::new(ThresholdConfig::default());
//!
//! let mut sampler = Sampler::new(instance_monitor::sampler::DEFAULT_INTERVAL);
//! let mut state = sampler.subscribe();
//! sampler.start(Arc::new(source), thresholds.clone());
//!
//! state.changed().await.unwrap();
//! for key in state.borrow().alerts.iter() {
//!     println!("{} breached", key);
//! }
//!
//! // Thresholds can change while sampling
//! thresholds.update(|t| t.cpu = 95.0);
//! sampler.reevaluate();
//! # });
//! ```
//!
//! ### Feeding payloads from another transport
//!
//! ```
//! use std::sync::Arc;
//! use instance_monitor::{ChannelSource, Sampler, SharedThresholds};
//!
//! # tokio_test::block_on(async {
//! let (tx, source) = ChannelSource::create("embedded");
//! tx.send(Some(serde_json::json!({ "cpu_metrics": { "cpu_usage": 12.5 } }))).unwrap();
//!
//! let mut sampler = Sampler::new(std::time::Duration::from_secs(1));
//! sampler.start(Arc::new(source), SharedThresholds::default());
//! # });
//! ```

pub mod app;
pub mod data;
pub mod error;
pub mod events;
pub mod sampler;
pub mod settings;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use data::{
    AlertState, ChartSeries, CurrentTest, HistoryWindow, MetricKey, MetricSnapshot, MonitorState,
    SharedThresholds, ThresholdConfig, ThresholdField,
};
pub use error::{FailureKind, SampleError};
pub use sampler::{collect_once, Sampler};
pub use settings::{InstanceConfig, Settings};
pub use source::{ChannelSource, FileSource, HttpSource, MetricsSource};
