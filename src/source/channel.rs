//! Channel-based data source.
//!
//! Serves the latest payload pushed through a tokio watch channel. This is
//! useful when the payload already arrives through another transport (a
//! message bus, an embedding application) and only the dashboard pipeline
//! is wanted.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use super::MetricsSource;
use crate::error::SampleError;

/// A data source that returns whatever payload was last sent on a channel.
///
/// # Example
///
/// ```
/// use instance_monitor::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("embedded");
/// tx.send(Some(serde_json::json!({ "cpu_metrics": { "cpu_usage": 3.0 } }))).unwrap();
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Option<Value>>,
    description: String,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - Where the payloads come from
    pub fn new(receiver: watch::Receiver<Option<Value>>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
        }
    }

    /// Create a channel pair for pushing payloads to a ChannelSource.
    ///
    /// Until something is sent, fetches fail with "no payload published".
    pub fn create(source_description: &str) -> (watch::Sender<Option<Value>>, Self) {
        let (tx, rx) = watch::channel(None);
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

#[async_trait]
impl MetricsSource for ChannelSource {
    async fn fetch(&self) -> Result<Value, SampleError> {
        if self.receiver.has_changed().is_err() {
            return Err(SampleError::Fetch("channel closed".to_string()));
        }
        self.receiver
            .borrow()
            .clone()
            .ok_or_else(|| SampleError::Fetch("no payload published".to_string()))
    }

    fn description(&self) -> &str {
        &self.description
    }
}
