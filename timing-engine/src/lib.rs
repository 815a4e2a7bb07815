//! Hardware Timing Analysis Engine
//!
//! A stateless library that derives timing facts from a stream of hardware
//! signal-toggle records (one record per rising or falling edge).
//!
//! # Architecture
//!
//! Data flows one way:
//! `ToggleRecord` → interval extraction → {statistics, synchronicity, propagation}
//!
//! - Pairs start/end edges into executions per (device, event), using the
//!   correlation id to disambiguate interleaved executions
//! - Computes count/mean/std/min/max per group
//! - Measures cross-device skew of sync pulses
//! - Traces tagged messages down a positional device chain
//!
//! The library does NOT:
//! - Read files or validate raw input
//! - Keep state between calls
//! - Render charts or reports
//!
//! Every entry point takes the record set as an argument and returns plain,
//! serializable data, so callers may run analyses concurrently over shared
//! snapshots. File ingestion and reporting live in the application layer
//! (timing-cli).
//!
//! # Example Usage
//!
//! ```
//! use timing_engine::{analyze_execution_timing, analyze_synchronicity, AnalysisConfig, ToggleRecord};
//!
//! let records = vec![
//!     ToggleRecord::new("GPIO_Init", 1000, true),
//!     ToggleRecord::new("GPIO_Init", 1500, false),
//! ];
//!
//! let report = analyze_execution_timing(&records);
//! let stats = report.get(None, "GPIO_Init").unwrap();
//! assert_eq!(stats.mean, 500.0);
//!
//! let pulses = analyze_synchronicity(&records, &AnalysisConfig::new());
//! assert!(pulses.is_empty());
//! ```

// Public modules
pub mod config;
pub mod intervals;
pub mod propagation;
pub mod stats;
pub mod sync;
pub mod types;

// Re-export main types for convenience
pub use config::AnalysisConfig;
pub use intervals::{extract_grouped, extract_intervals, group_records, GroupKey};
pub use propagation::{analyze_propagation, summarize_propagation, PropagationSummary};
pub use stats::{
    analyze_execution_timing, compute_statistics, EventRanking, TimingReport, TimingSummary,
};
pub use sync::{analyze_synchronicity, summarize_sync, SyncSummary};
pub use types::{
    AnalysisError, Execution, ExecutionStats, MessagePropagation, Nanos, PairwiseDiff,
    PropagationRecord, Result, SyncPulse, ToggleRecord, DEFAULT_DEVICE,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: every entry point accepts an empty record set
        let config = AnalysisConfig::new();
        assert!(analyze_execution_timing(&[]).is_empty());
        assert!(analyze_synchronicity(&[], &config).is_empty());
        assert!(analyze_propagation(&[], &config).is_empty());
        let records: Vec<ToggleRecord> = Vec::new();
        assert!(extract_intervals(&records).is_empty());
    }
}
