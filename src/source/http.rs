//! HTTP data source.
//!
//! Issues a plain GET against the monitoring endpoint every cycle.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::MetricsSource;
use crate::error::SampleError;

/// A source that fetches payloads from an HTTP endpoint.
///
/// Non-2xx answers, transport errors, timeouts and bodies that are not JSON
/// all surface as [`SampleError`]s.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
    description: String,
}

impl HttpSource {
    /// Create a source for `url` with a per-request timeout.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SampleError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SampleError::Fetch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
            description: format!("http: {}", url),
        })
    }

    /// Returns the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MetricsSource for HttpSource {
    async fn fetch(&self) -> Result<Value, SampleError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(SampleError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let payload = serde_json::from_slice(&body)?;
        Ok(payload)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{"cpu_metrics":{"cpu_usage":12.5},"current_test":{"type":"None","duration":0}}"#
    }

    #[tokio::test]
    async fn test_http_source_fetches_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(sample_json())
            .create_async()
            .await;

        let source =
            HttpSource::new(&format!("{}/api", server.url()), Duration::from_secs(2)).unwrap();
        let payload = source.fetch().await.unwrap();

        assert_eq!(payload["cpu_metrics"]["cpu_usage"], 12.5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_source_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/api").with_status(503).create_async().await;

        let source =
            HttpSource::new(&format!("{}/api", server.url()), Duration::from_secs(2)).unwrap();
        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, SampleError::Status(503)));
    }

    #[tokio::test]
    async fn test_http_source_invalid_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let source =
            HttpSource::new(&format!("{}/api", server.url()), Duration::from_secs(2)).unwrap();
        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, SampleError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_http_source_connection_refused() {
        // reserve a free port, then release it so nothing is listening
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/api", port);
        let source = HttpSource::new(&url, Duration::from_secs(2)).unwrap();
        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, SampleError::Fetch(_) | SampleError::Timeout));
    }

    #[test]
    fn test_http_source_description() {
        let source = HttpSource::new("http://10.0.0.2:5000/api", Duration::from_secs(1)).unwrap();
        assert_eq!(source.description(), "http: http://10.0.0.2:5000/api");
        assert_eq!(source.url(), "http://10.0.0.2:5000/api");
    }
}
