//! Runtime settings.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then environment variables prefixed with `INSTANCE_MONITOR`, then CLI
//! flags (applied by the binary).
//!
//! ```toml
//! interval = "5s"
//! request_timeout = "4s"
//!
//! [thresholds]
//! cpu = 80
//! memory = 80
//! disk = 90
//! network_in = 50
//! network_out = 50
//!
//! [[instances]]
//! name = "Instance 1"
//! url = "http://10.0.0.1:5000/api"
//!
//! [[instances]]
//! name = "Instance 2"
//! url = "http://10.0.0.2:5000/api"
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration;
use crate::data::ThresholdConfig;
use crate::sampler::DEFAULT_INTERVAL;

/// Environment variable prefix, e.g. `INSTANCE_MONITOR_INTERVAL=10s`.
pub const ENV_PREFIX: &str = "INSTANCE_MONITOR";

/// One remote target the dashboard can switch to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstanceConfig {
    pub name: String,
    pub url: String,
}

impl InstanceConfig {
    /// Parse `NAME=URL`, or a bare URL named after its position.
    pub fn parse(spec: &str, index: usize) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            bail!("Empty instance specification");
        }
        match spec.split_once('=') {
            Some((name, url)) if !name.is_empty() && !name.contains("://") => {
                if url.is_empty() {
                    bail!("Instance {} has no URL", name);
                }
                Ok(Self {
                    name: name.trim().to_string(),
                    url: url.trim().to_string(),
                })
            }
            _ => Ok(Self {
                name: format!("Instance {}", index + 1),
                url: spec.to_string(),
            }),
        }
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Polling interval.
    #[serde(deserialize_with = "duration::deserialize")]
    pub interval: Duration,
    /// Per-request timeout for HTTP sources.
    #[serde(deserialize_with = "duration::deserialize")]
    pub request_timeout: Duration,
    pub thresholds: ThresholdConfig,
    pub instances: Vec<InstanceConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            request_timeout: Duration::from_secs(4),
            thresholds: ThresholdConfig::default(),
            instances: vec![InstanceConfig {
                name: "Instance 1".to_string(),
                url: "http://127.0.0.1:5000/api".to_string(),
            }],
        }
    }
}

impl Settings {
    /// Load settings from an optional file plus the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to read settings")?;

        let settings: Settings =
            config.try_deserialize().context("Invalid settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the sampler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            bail!("Polling interval must be greater than zero");
        }
        if self.instances.is_empty() {
            bail!("At least one instance must be configured");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.interval, Duration::from_millis(5000));
        assert_eq!(settings.thresholds, ThresholdConfig::default());
        assert_eq!(settings.instances.len(), 1);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
interval = "10s"

[thresholds]
cpu = 95
network_in = 500

[[instances]]
name = "edge"
url = "http://10.1.1.1:5000/api"

[[instances]]
name = "core"
url = "http://10.1.1.2:5000/api"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.interval, Duration::from_secs(10));
        assert_eq!(settings.request_timeout, Duration::from_secs(4));
        assert_eq!(settings.thresholds.cpu, 95.0);
        assert_eq!(settings.thresholds.network_in, 500.0);
        assert_eq!(settings.thresholds.disk, 90.0);
        assert_eq!(settings.instances[1].name, "core");
    }

    #[test]
    fn test_load_rejects_empty_instance_list() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "instances = []").unwrap();
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_parse_instance_spec() {
        let named = InstanceConfig::parse("edge=http://10.0.0.1:5000/api", 0).unwrap();
        assert_eq!(named.name, "edge");
        assert_eq!(named.url, "http://10.0.0.1:5000/api");

        let bare = InstanceConfig::parse("http://10.0.0.2:5000/api?x=1", 1).unwrap();
        assert_eq!(bare.name, "Instance 2");
        assert_eq!(bare.url, "http://10.0.0.2:5000/api?x=1");

        assert!(InstanceConfig::parse("edge=", 0).is_err());
        assert!(InstanceConfig::parse("  ", 0).is_err());
    }
}
