//! Threshold configuration and breach evaluation.
//!
//! Thresholds live behind a [`SharedThresholds`] handle so that the UI (or
//! any other actor) can change them while the sampler is running; every
//! evaluation reads the current values.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::snapshot::MetricSnapshot;

/// Alert thresholds.
///
/// `network_in` / `network_out` apply both to the I/O megabyte series and
/// to the socket-count series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
    pub network_in: f64,
    pub network_out: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            cpu: 80.0,
            memory: 80.0,
            disk: 90.0,
            network_in: 50.0,
            network_out: 50.0,
        }
    }
}

/// One adjustable threshold field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdField {
    Cpu,
    Memory,
    Disk,
    NetworkIn,
    NetworkOut,
}

impl ThresholdField {
    pub const ALL: [ThresholdField; 5] = [
        ThresholdField::Cpu,
        ThresholdField::Memory,
        ThresholdField::Disk,
        ThresholdField::NetworkIn,
        ThresholdField::NetworkOut,
    ];

    /// Cycle to the next field.
    pub fn next(self) -> Self {
        match self {
            ThresholdField::Cpu => ThresholdField::Memory,
            ThresholdField::Memory => ThresholdField::Disk,
            ThresholdField::Disk => ThresholdField::NetworkIn,
            ThresholdField::NetworkIn => ThresholdField::NetworkOut,
            ThresholdField::NetworkOut => ThresholdField::Cpu,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ThresholdField::Cpu => "CPU (%)",
            ThresholdField::Memory => "Memory (%)",
            ThresholdField::Disk => "Disk (%)",
            ThresholdField::NetworkIn => "Net In",
            ThresholdField::NetworkOut => "Net Out",
        }
    }

    /// Upper end of the range the settings surface offers.
    pub fn upper_bound(&self) -> f64 {
        match self {
            ThresholdField::Cpu | ThresholdField::Memory | ThresholdField::Disk => 100.0,
            ThresholdField::NetworkIn | ThresholdField::NetworkOut => 1000.0,
        }
    }

    pub fn get(&self, config: &ThresholdConfig) -> f64 {
        match self {
            ThresholdField::Cpu => config.cpu,
            ThresholdField::Memory => config.memory,
            ThresholdField::Disk => config.disk,
            ThresholdField::NetworkIn => config.network_in,
            ThresholdField::NetworkOut => config.network_out,
        }
    }

    pub fn set(&self, config: &mut ThresholdConfig, value: f64) {
        match self {
            ThresholdField::Cpu => config.cpu = value,
            ThresholdField::Memory => config.memory = value,
            ThresholdField::Disk => config.disk = value,
            ThresholdField::NetworkIn => config.network_in = value,
            ThresholdField::NetworkOut => config.network_out = value,
        }
    }
}

/// Cloneable handle to thresholds owned outside the sampler.
#[derive(Debug, Clone, Default)]
pub struct SharedThresholds {
    inner: Arc<RwLock<ThresholdConfig>>,
}

impl SharedThresholds {
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Current values.
    pub fn get(&self) -> ThresholdConfig {
        *self.inner.read()
    }

    /// Replace every value.
    pub fn set(&self, config: ThresholdConfig) {
        *self.inner.write() = config;
    }

    /// Change a single field in place and return the new configuration.
    pub fn update(&self, f: impl FnOnce(&mut ThresholdConfig)) -> ThresholdConfig {
        let mut guard = self.inner.write();
        f(&mut *guard);
        *guard
    }
}

/// A metric that can be drawn and compared against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Cpu,
    Memory,
    Disk,
    IoIn,
    IoOut,
    NetworkIn,
    NetworkOut,
}

impl MetricKey {
    /// Keys that participate in [`AlertState`].
    pub const ALERTED: [MetricKey; 5] = [
        MetricKey::Cpu,
        MetricKey::Memory,
        MetricKey::Disk,
        MetricKey::IoIn,
        MetricKey::IoOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::Cpu => "cpu",
            MetricKey::Memory => "memory",
            MetricKey::Disk => "disk",
            MetricKey::IoIn => "io_in",
            MetricKey::IoOut => "io_out",
            MetricKey::NetworkIn => "network_in",
            MetricKey::NetworkOut => "network_out",
        }
    }

    /// Chart legend label.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKey::Cpu => "CPU Usage (%)",
            MetricKey::Memory => "Memory Usage (%)",
            MetricKey::Disk => "Disk Usage (%)",
            MetricKey::IoIn => "I/O In (MB)",
            MetricKey::IoOut => "I/O Out (MB)",
            MetricKey::NetworkIn => "Active Sockets",
            MetricKey::NetworkOut => "Established Sockets",
        }
    }

    /// The threshold this metric is compared against.
    pub fn threshold_field(&self) -> ThresholdField {
        match self {
            MetricKey::Cpu => ThresholdField::Cpu,
            MetricKey::Memory => ThresholdField::Memory,
            MetricKey::Disk => ThresholdField::Disk,
            MetricKey::IoIn | MetricKey::NetworkIn => ThresholdField::NetworkIn,
            MetricKey::IoOut | MetricKey::NetworkOut => ThresholdField::NetworkOut,
        }
    }

    /// Read this metric from a snapshot.
    pub fn value(&self, snapshot: &MetricSnapshot) -> f64 {
        match self {
            MetricKey::Cpu => snapshot.cpu,
            MetricKey::Memory => snapshot.memory,
            MetricKey::Disk => snapshot.disk,
            MetricKey::IoIn => snapshot.io_in,
            MetricKey::IoOut => snapshot.io_out,
            MetricKey::NetworkIn => snapshot.network_in as f64,
            MetricKey::NetworkOut => snapshot.network_out as f64,
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True iff `value` strictly exceeds the threshold for `key`.
pub fn breaches(key: MetricKey, value: f64, thresholds: &ThresholdConfig) -> bool {
    value > key.threshold_field().get(thresholds)
}

/// Metrics currently above their thresholds.
///
/// Keys not present are not breached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertState {
    breached: BTreeSet<MetricKey>,
}

impl AlertState {
    /// Evaluate every alerted metric of `snapshot` from scratch.
    pub fn evaluate(snapshot: &MetricSnapshot, thresholds: &ThresholdConfig) -> Self {
        let breached = MetricKey::ALERTED
            .into_iter()
            .filter(|key| breaches(*key, key.value(snapshot), thresholds))
            .collect();
        Self { breached }
    }

    pub fn is_breached(&self, key: MetricKey) -> bool {
        self.breached.contains(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = MetricKey> + '_ {
        self.breached.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.breached.is_empty()
    }
}
