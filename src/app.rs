//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::data::{
    ChartSeries, MonitorState, SeriesCache, SharedThresholds, ThresholdConfig, ThresholdField,
};
use crate::sampler::Sampler;
use crate::settings::InstanceConfig;
use crate::source;
use crate::ui::Theme;

/// How long a temporary status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// CPU, memory and disk utilisation in percent.
    Resources,
    /// I/O throughput in megabytes.
    Io,
    /// Active and established socket counts.
    Network,
}

impl View {
    pub const ALL: [View; 3] = [View::Resources, View::Io, View::Network];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Resources => View::Io,
            View::Io => View::Network,
            View::Network => View::Resources,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Resources => View::Network,
            View::Io => View::Resources,
            View::Network => View::Io,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Resources => "Resources",
            View::Io => "I/O",
            View::Network => "Network",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Resources => 0,
            View::Io => 1,
            View::Network => 2,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_thresholds: bool,

    sampler: Sampler,
    updates: watch::Receiver<MonitorState>,
    /// Latest state published by the sampler.
    pub data: MonitorState,
    series: SeriesCache,

    pub instances: Vec<InstanceConfig>,
    pub selected_instance: usize,
    request_timeout: Duration,

    pub thresholds: SharedThresholds,
    pub selected_threshold: ThresholdField,

    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an idle app. Call [`App::connect`] to start sampling.
    pub fn new(
        sampler: Sampler,
        instances: Vec<InstanceConfig>,
        thresholds: SharedThresholds,
        request_timeout: Duration,
    ) -> Self {
        let updates = sampler.subscribe();
        let data = updates.borrow().clone();
        Self {
            running: true,
            current_view: View::Resources,
            show_help: false,
            show_thresholds: false,
            sampler,
            updates,
            data,
            series: SeriesCache::new(),
            instances,
            selected_instance: 0,
            request_timeout,
            thresholds,
            selected_threshold: ThresholdField::Cpu,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Start sampling the currently selected instance.
    pub fn connect(&mut self) -> Result<()> {
        self.select_instance(self.selected_instance)
    }

    /// The instance being sampled, if any is configured.
    pub fn instance(&self) -> Option<&InstanceConfig> {
        self.instances.get(self.selected_instance)
    }

    /// Switch to another instance, restarting the sampler on its URL.
    ///
    /// The history window starts empty for the new target. Must be called
    /// from within a Tokio runtime.
    pub fn select_instance(&mut self, index: usize) -> Result<()> {
        let Some(instance) = self.instances.get(index) else {
            bail!("No instance at index {}", index);
        };
        let name = instance.name.clone();
        let source = source::open(&instance.url, self.request_timeout)?;

        self.sampler.start(source, self.thresholds.clone());
        self.selected_instance = index;
        self.refresh();
        info!("Switched to instance {}", name);
        Ok(())
    }

    /// Cycle to the next configured instance.
    pub fn next_instance(&mut self) {
        if self.instances.len() < 2 {
            return;
        }
        let index = (self.selected_instance + 1) % self.instances.len();
        self.switch_instance(index);
    }

    /// Cycle to the previous configured instance.
    pub fn prev_instance(&mut self) {
        if self.instances.len() < 2 {
            return;
        }
        let len = self.instances.len();
        let index = (self.selected_instance + len - 1) % len;
        self.switch_instance(index);
    }

    fn switch_instance(&mut self, index: usize) {
        match self.select_instance(index) {
            Ok(()) => {
                let name = self.instances[index].name.clone();
                self.set_status_message(format!("Monitoring {}", name));
            }
            Err(e) => {
                warn!("Failed to switch instance: {}", e);
                self.set_status_message(format!("Switch failed: {}", e));
            }
        }
    }

    /// Stop sampling and discard the window.
    pub fn disconnect(&mut self) {
        self.sampler.stop();
        self.refresh();
    }

    /// Pull the latest state from the sampler.
    ///
    /// Returns true if anything changed since the last call.
    pub fn refresh(&mut self) -> bool {
        let changed = self.updates.has_changed().unwrap_or(false);
        if changed {
            self.data = self.updates.borrow_and_update().clone();
        }
        self.series.get(self.data.generation, &self.data.history);
        changed
    }

    /// Chart projections of the current window.
    pub fn series(&self) -> &ChartSeries {
        self.series.current()
    }

    /// Threshold values as of now.
    pub fn threshold_config(&self) -> ThresholdConfig {
        self.thresholds.get()
    }

    /// Cycle which threshold `+`/`-` adjust.
    pub fn next_threshold(&mut self) {
        self.selected_threshold = self.selected_threshold.next();
        self.show_thresholds = true;
    }

    /// Raise (`direction > 0`) or lower the selected threshold by one step.
    ///
    /// Alerts for the latest snapshot are re-evaluated right away.
    pub fn adjust_threshold(&mut self, direction: f64) {
        let field = self.selected_threshold;
        let step = threshold_step(field);
        let updated = self.thresholds.update(|config| {
            let value = (field.get(config) + step * direction.signum()).clamp(0.0, field.upper_bound());
            field.set(config, value);
        });

        self.sampler.reevaluate();
        self.refresh();
        self.show_thresholds = true;
        self.set_status_message(format!("{} threshold: {}", field.label(), field.get(&updated)));
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Toggle the threshold panel.
    pub fn toggle_thresholds(&mut self) {
        self.show_thresholds = !self.show_thresholds;
    }

    /// Close overlays, one per call.
    pub fn go_back(&mut self) {
        if self.show_help {
            self.show_help = false;
        } else if self.show_thresholds {
            self.show_thresholds = false;
        } else {
            self.current_view = View::Resources;
        }
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current dashboard view to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if !self.data.has_data() {
            bail!("No data to export");
        }
        let document = export_document(self.instance(), &self.data, &self.threshold_config());
        write_export(path, &document)
    }
}

/// Step used by [`App::adjust_threshold`].
fn threshold_step(field: ThresholdField) -> f64 {
    match field {
        ThresholdField::Cpu | ThresholdField::Memory | ThresholdField::Disk => 5.0,
        ThresholdField::NetworkIn | ThresholdField::NetworkOut => 10.0,
    }
}

/// Build the JSON document describing what the dashboard shows for `state`.
pub fn export_document(
    instance: Option<&InstanceConfig>,
    state: &MonitorState,
    thresholds: &ThresholdConfig,
) -> Value {
    let series = ChartSeries::project(state.history.iter());
    let alerts: Vec<&str> = state.alerts.iter().map(|key| key.as_str()).collect();

    json!({
        "exported_at": chrono::Local::now().to_rfc3339(),
        "instance": instance.map(|i| json!({ "name": i.name, "url": i.url })),
        "source": state.source,
        "current_test": state.current_test,
        "thresholds": thresholds,
        "alerts": alerts,
        "latest": state.history.latest(),
        "series": series,
        "last_error": state.last_error,
        "stats": {
            "accepted": state.stats.accepted,
            "unchanged": state.stats.unchanged,
            "failed": state.stats.failed,
        },
    })
}

/// Write an export document as pretty JSON.
pub fn write_export(path: &Path, document: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(path, json)?;
    Ok(())
}
