//! Sources of raw metrics payloads.
//!
//! The sampler asks a [`MetricsSource`] for one payload per cycle. The
//! production source is an HTTP endpoint; files and channels are provided
//! for offline use and for embedding.

mod channel;
mod file;
mod http;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use http::HttpSource;

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SampleError;

/// Something that can produce the raw JSON payload of one sample.
///
/// # Example
///
/// ```no_run
/// use instance_monitor::{HttpSource, MetricsSource};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let source = HttpSource::new("http://127.0.0.1:5000/api", Duration::from_secs(4)).unwrap();
/// match source.fetch().await {
///     Ok(payload) => println!("{}", payload),
///     Err(e) => eprintln!("{}", e),
/// }
/// # });
/// ```
#[async_trait]
pub trait MetricsSource: Send + Sync + Debug {
    /// Fetch one payload.
    ///
    /// May suspend; the sampler never calls it concurrently for the same
    /// lifecycle.
    async fn fetch(&self) -> Result<Value, SampleError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI header and in logs.
    fn description(&self) -> &str;
}

/// Open a source for `target`.
///
/// `http://` and `https://` targets become an [`HttpSource`]; anything else
/// (optionally prefixed with `file://`) is read as a JSON file.
pub fn open(target: &str, timeout: Duration) -> Result<Arc<dyn MetricsSource>, SampleError> {
    if target.starts_with("http://") || target.starts_with("https://") {
        return Ok(Arc::new(HttpSource::new(target, timeout)?));
    }
    let path = target.strip_prefix("file://").unwrap_or(target);
    Ok(Arc::new(FileSource::new(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_picks_http_source() {
        let source = open("http://localhost:5000/api", Duration::from_secs(1)).unwrap();
        assert_eq!(source.description(), "http: http://localhost:5000/api");
    }

    #[test]
    fn test_open_picks_file_source() {
        let source = open("file:///tmp/metrics.json", Duration::from_secs(1)).unwrap();
        assert_eq!(source.description(), "file: /tmp/metrics.json");

        let source = open("metrics.json", Duration::from_secs(1)).unwrap();
        assert_eq!(source.description(), "file: metrics.json");
    }
}
