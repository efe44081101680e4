//! Error types for sampling cycles.

use thiserror::Error;

/// Errors that can end a single fetch-and-process cycle.
///
/// None of these are fatal: the sampler logs them, records the message for
/// the status bar and waits for the next tick.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The request could not be sent or the connection failed.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// The endpoint did not answer within the request timeout.
    #[error("Request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("Endpoint returned status {0}")]
    Status(u16),

    /// The body was not JSON, or not a JSON object.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

/// Coarse classification used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    FetchFailure,
    MalformedPayload,
}

impl SampleError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SampleError::Fetch(_) | SampleError::Timeout | SampleError::Status(_) => {
                FailureKind::FetchFailure
            }
            SampleError::MalformedPayload(_) => FailureKind::MalformedPayload,
        }
    }
}

impl From<reqwest::Error> for SampleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SampleError::Timeout
        } else if err.is_decode() {
            SampleError::MalformedPayload(err.to_string())
        } else if let Some(status) = err.status() {
            SampleError::Status(status.as_u16())
        } else {
            SampleError::Fetch(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SampleError {
    fn from(err: serde_json::Error) -> Self {
        SampleError::MalformedPayload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(SampleError::Timeout.kind(), FailureKind::FetchFailure);
        assert_eq!(SampleError::Status(503).kind(), FailureKind::FetchFailure);
        assert_eq!(
            SampleError::Fetch("refused".into()).kind(),
            FailureKind::FetchFailure
        );
        assert_eq!(
            SampleError::MalformedPayload("not an object".into()).kind(),
            FailureKind::MalformedPayload
        );
    }

    #[test]
    fn test_json_error_is_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = SampleError::from(err);
        assert!(matches!(err, SampleError::MalformedPayload(_)));
        assert!(err.to_string().starts_with("Malformed payload"));
    }
}
