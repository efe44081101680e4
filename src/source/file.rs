//! File-based data source.
//!
//! Reads a JSON payload from disk on every cycle. Handy for replaying a
//! captured endpoint response or for feeding the dashboard from a script
//! that rewrites the file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use super::MetricsSource;
use crate::error::SampleError;

/// A data source that reads payloads from a JSON file.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MetricsSource for FileSource {
    async fn fetch(&self) -> Result<Value, SampleError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SampleError::Fetch(format!("Read error: {}", e)))?;
        let payload = serde_json::from_str(&content)?;
        Ok(payload)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, Write};
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "cpu_metrics": { "cpu_usage": 55.5 },
            "sock_metrics": { "active_sockets": 9, "established_sockets": 4 }
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/test.json");
        assert_eq!(source.path(), Path::new("/tmp/test.json"));
        assert_eq!(source.description(), "file: /tmp/test.json");
    }

    #[tokio::test]
    async fn test_file_source_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let source = FileSource::new(file.path());
        let payload = source.fetch().await.unwrap();
        assert_eq!(payload["cpu_metrics"]["cpu_usage"], 55.5);
    }

    #[tokio::test]
    async fn test_file_source_sees_rewrites() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();
        let source = FileSource::new(file.path());
        let _ = source.fetch().await.unwrap();

        file.as_file_mut().set_len(0).unwrap();
        file.rewind().unwrap();
        writeln!(file, r#"{{"cpu_metrics": {{"cpu_usage": 1.0}}}}"#).unwrap();
        file.flush().unwrap();

        let payload = source.fetch().await.unwrap();
        assert_eq!(payload["cpu_metrics"]["cpu_usage"], 1.0);
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileSource::new("/nonexistent/path/metrics.json");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, SampleError::Fetch(_)));
        assert!(err.to_string().contains("Read error"));
    }

    #[tokio::test]
    async fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let source = FileSource::new(file.path());
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, SampleError::MalformedPayload(_)));
    }
}
