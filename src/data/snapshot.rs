//! Normalization of raw endpoint payloads into typed snapshots.
//!
//! The endpoint answers with nested metric groups:
//!
//! ```json
//! {
//!   "current_test": { "type": "cpu-stress", "duration": 30 },
//!   "cpu_metrics": { "cpu_usage": 12.5, "cpu_cores": 8 },
//!   "vm_metrics": { "memory_percent": 41.0 },
//!   "filesystem_metrics": { "disk_percent": 63.2 },
//!   "io_metrics": { "io_bytes_recv": 1048576, "io_bytes_sent": 524288 },
//!   "sock_metrics": { "active_sockets": 14, "established_sockets": 6 }
//! }
//! ```
//!
//! Any group or field may be missing; missing or non-numeric values
//! normalize to zero instead of failing the cycle.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SampleError;

/// Bytes per megabyte used for the I/O counters.
pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Display format for snapshot timestamps.
const TIME_FORMAT: &str = "%H:%M:%S";

/// One normalized sample of every tracked metric.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Local time of day when the sample was normalized.
    pub time: String,
    /// CPU usage, percent.
    pub cpu: f64,
    /// Memory usage, percent.
    pub memory: f64,
    /// Root filesystem usage, percent.
    pub disk: f64,
    /// Bytes received, in MB.
    pub io_in: f64,
    /// Bytes sent, in MB.
    pub io_out: f64,
    /// Active sockets.
    pub network_in: u64,
    /// Established sockets.
    pub network_out: u64,
}

/// The operation the remote host reports as currently running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTest {
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: f64,
}

impl Default for CurrentTest {
    fn default() -> Self {
        Self {
            kind: "None".to_string(),
            duration: 0.0,
        }
    }
}

/// Output of one successful fetch: the snapshot plus the pass-through
/// current-test descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub snapshot: MetricSnapshot,
    pub current_test: CurrentTest,
}

/// Normalize a raw payload observed at `at`.
///
/// Fails only when the payload is not a JSON object.
pub fn normalize(payload: &Value, at: DateTime<Local>) -> Result<Sample, SampleError> {
    if !payload.is_object() {
        return Err(SampleError::MalformedPayload(format!(
            "expected a JSON object, got {}",
            json_type_name(payload)
        )));
    }

    let snapshot = MetricSnapshot {
        time: at.format(TIME_FORMAT).to_string(),
        cpu: number_at(payload, "/cpu_metrics/cpu_usage"),
        memory: number_at(payload, "/vm_metrics/memory_percent"),
        disk: number_at(payload, "/filesystem_metrics/disk_percent"),
        io_in: number_at(payload, "/io_metrics/io_bytes_recv") / BYTES_PER_MEGABYTE,
        io_out: number_at(payload, "/io_metrics/io_bytes_sent") / BYTES_PER_MEGABYTE,
        network_in: count_at(payload, "/sock_metrics/active_sockets"),
        network_out: count_at(payload, "/sock_metrics/established_sockets"),
    };

    let current_test = payload
        .get("current_test")
        .and_then(|v| serde_json::from_value::<CurrentTest>(v.clone()).ok())
        .unwrap_or_default();

    Ok(Sample {
        snapshot,
        current_test,
    })
}

fn number_at(payload: &Value, pointer: &str) -> f64 {
    payload
        .pointer(pointer)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn count_at(payload: &Value, pointer: &str) -> u64 {
    match payload.pointer(pointer) {
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        None => 0,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 14, 5, 9).unwrap()
    }

    fn full_payload() -> Value {
        json!({
            "current_test": { "type": "memory-stress", "duration": 45 },
            "cpu_metrics": { "cpu_usage": 37.5, "cpu_cores": 4 },
            "vm_metrics": { "memory_percent": 62.1, "memory_total": 8000000000u64 },
            "filesystem_metrics": { "disk_percent": 71.0 },
            "io_metrics": { "io_bytes_recv": 3145728, "io_bytes_sent": 524288 },
            "sock_metrics": { "active_sockets": 42, "established_sockets": 17 }
        })
    }

    #[test]
    fn test_normalize_full_payload() {
        let sample = normalize(&full_payload(), at()).unwrap();
        let s = &sample.snapshot;

        assert_eq!(s.time, "14:05:09");
        assert_eq!(s.cpu, 37.5);
        assert_eq!(s.memory, 62.1);
        assert_eq!(s.disk, 71.0);
        assert_eq!(s.io_in, 3.0);
        assert_eq!(s.io_out, 0.5);
        assert_eq!(s.network_in, 42);
        assert_eq!(s.network_out, 17);

        assert_eq!(sample.current_test.kind, "memory-stress");
        assert_eq!(sample.current_test.duration, 45.0);
    }

    #[test]
    fn test_missing_groups_default_to_zero() {
        let payload = json!({
            "cpu_metrics": { "cpu_usage": 12.0 },
            "io_metrics": { "io_bytes_sent": 1048576 }
        });
        let s = normalize(&payload, at()).unwrap().snapshot;

        assert_eq!(s.cpu, 12.0);
        assert_eq!(s.memory, 0.0);
        assert_eq!(s.disk, 0.0);
        assert_eq!(s.io_in, 0.0);
        assert_eq!(s.io_out, 1.0);
        assert_eq!(s.network_in, 0);
        assert_eq!(s.network_out, 0);
    }

    #[test]
    fn test_non_numeric_fields_default_to_zero() {
        let payload = json!({
            "cpu_metrics": { "cpu_usage": "high" },
            "vm_metrics": null,
            "sock_metrics": { "active_sockets": 3.0, "established_sockets": -2 }
        });
        let s = normalize(&payload, at()).unwrap().snapshot;

        assert_eq!(s.cpu, 0.0);
        assert_eq!(s.memory, 0.0);
        assert_eq!(s.network_in, 3);
        assert_eq!(s.network_out, 0);
    }

    #[test]
    fn test_empty_object_is_all_zero() {
        let sample = normalize(&json!({}), at()).unwrap();
        assert_eq!(
            sample.snapshot,
            MetricSnapshot {
                time: "14:05:09".to_string(),
                ..MetricSnapshot::default()
            }
        );
        assert_eq!(sample.current_test, CurrentTest::default());
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        for payload in [json!([1, 2, 3]), json!("ok"), json!(null), json!(7)] {
            let err = normalize(&payload, at()).unwrap_err();
            assert!(matches!(err, SampleError::MalformedPayload(_)));
        }
    }

    #[test]
    fn test_malformed_current_test_resets_to_default() {
        let payload = json!({ "current_test": { "kind": "wrong-shape" } });
        let sample = normalize(&payload, at()).unwrap();
        assert_eq!(sample.current_test, CurrentTest::default());
    }

    #[test]
    fn test_normalize_does_not_mutate_input() {
        let payload = full_payload();
        let before = payload.clone();
        let _ = normalize(&payload, at());
        assert_eq!(payload, before);
    }
}
