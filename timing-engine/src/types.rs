//! Core types for the timing analysis engine
//!
//! This module defines the record model the engine consumes and every result
//! structure it produces. All results are plain data: they derive `Serialize`
//! so any reporting layer can render them without knowing about the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nanosecond timestamp used throughout the engine
pub type Nanos = i64;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur when setting up an analysis
///
/// The analysis functions themselves never fail: empty input, unterminated
/// start edges and single-device sync groups all resolve to empty results.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid analysis configuration: {0}")]
    InvalidConfig(String),
}

/// One observed edge of a logical signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleRecord {
    /// Originating device (None = the single implicit device)
    pub device_id: Option<String>,
    /// Name of the event the signal represents (e.g. "GPIO_Init")
    pub event_name: String,
    /// Timestamp in nanoseconds
    pub timestamp: Nanos,
    /// True for a rising (start) edge, false for a falling (end) edge
    pub toggled: bool,
    /// Ordinal placement of the device in a chain topology
    pub position: Option<i64>,
    /// Links a start edge to its end edge, and related edges across devices
    pub correlation_id: Option<String>,
}

impl ToggleRecord {
    /// Create a record for the implicit device with no position or correlation id
    pub fn new(event_name: impl Into<String>, timestamp: Nanos, toggled: bool) -> Self {
        Self {
            device_id: None,
            event_name: event_name.into(),
            timestamp,
            toggled,
            position: None,
            correlation_id: None,
        }
    }

    /// Builder method: set the originating device
    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Builder method: set the chain position
    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    /// Builder method: set the correlation id
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Convert the nanosecond timestamp to a wall-clock time (epoch based)
    pub fn timestamp_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.timestamp)
    }

    /// Device label for display, "default" for the implicit device
    pub fn device_label(&self) -> &str {
        self.device_id.as_deref().unwrap_or(DEFAULT_DEVICE)
    }
}

/// Display name of the implicit device
pub const DEFAULT_DEVICE: &str = "default";

/// One matched start/end pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    /// end_time - start_time; negative values are passed through unchanged
    pub duration: Nanos,
    pub start_time: Nanos,
    pub end_time: Nanos,
    /// Correlation id shared by the matched pair
    pub correlation_id: Option<String>,
}

/// Summary over the executions of one (device, event) group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: Nanos,
    pub max: Nanos,
    /// Executions in chronological order of start time
    pub executions: Vec<Execution>,
}

/// Absolute time difference between two devices for one sync pulse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseDiff {
    pub device_a: String,
    pub device_b: String,
    pub diff: Nanos,
}

/// Cross-device skew of one synchronization pulse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPulse {
    pub correlation_id: String,
    /// Number of distinct devices that reported a start edge
    pub device_count: usize,
    /// Start-edge timestamp per device, ordered by device label
    pub device_times: Vec<(String, Nanos)>,
    /// Every unordered device pair
    pub pairwise: Vec<PairwiseDiff>,
    pub max_diff: Nanos,
    pub min_diff: Nanos,
    pub mean_diff: f64,
    pub std_diff: f64,
}

/// One hop of a message from its sender to a receiving device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationRecord {
    pub from_device: String,
    pub to_device: String,
    pub from_position: i64,
    pub to_position: i64,
    /// |to_position - from_position|
    pub hop_count: u64,
    /// Receive timestamp minus send timestamp
    pub propagation_time: Nanos,
    /// propagation_time / hop_count, 0 when hop_count is 0
    pub time_per_hop: f64,
}

/// All hops observed for one tagged message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePropagation {
    pub correlation_id: String,
    pub send_device: String,
    pub send_position: i64,
    pub send_time: Nanos,
    pub hops: Vec<PropagationRecord>,
}

impl fmt::Display for PairwiseDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}: {} ns", self.device_a, self.device_b, self.diff)
    }
}

impl fmt::Display for PropagationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} -> {}@{}: {} hops, {} ns",
            self.from_device,
            self.from_position,
            self.to_device,
            self.to_position,
            self.hop_count,
            self.propagation_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = ToggleRecord::new("GPIO_Init", 1000, true)
            .with_device("Device_1")
            .with_position(1)
            .with_correlation_id("MSG_0");

        assert_eq!(record.device_id.as_deref(), Some("Device_1"));
        assert_eq!(record.position, Some(1));
        assert_eq!(record.correlation_id.as_deref(), Some("MSG_0"));
        assert_eq!(record.device_label(), "Device_1");
    }

    #[test]
    fn test_implicit_device_label() {
        let record = ToggleRecord::new("ADC_Read", 0, false);
        assert_eq!(record.device_label(), DEFAULT_DEVICE);
    }

    #[test]
    fn test_timestamp_utc() {
        let record = ToggleRecord::new("Timer_ISR", 1_500_000_000, true);
        let ts = record.timestamp_utc();
        assert_eq!(ts.timestamp(), 1);
        assert_eq!(ts.timestamp_subsec_nanos(), 500_000_000);
    }

    #[test]
    fn test_display() {
        let diff = PairwiseDiff {
            device_a: "Device_1".to_string(),
            device_b: "Device_2".to_string(),
            diff: 50,
        };
        assert_eq!(format!("{}", diff), "Device_1 <-> Device_2: 50 ns");
    }
}
