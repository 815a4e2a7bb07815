//! Execution statistics
//!
//! Aggregates executions into count/mean/std/min/max per (device, event)
//! group, and derives the headline figures across all groups.

use crate::intervals::extract_grouped;
use crate::types::{Execution, ExecutionStats, ToggleRecord, DEFAULT_DEVICE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summarize a set of executions
///
/// Returns `None` for an empty slice so callers never see a zero-count
/// record. The standard deviation is the population form.
pub fn compute_statistics(executions: &[Execution]) -> Option<ExecutionStats> {
    let min = executions.iter().map(|e| e.duration).min()?;
    let max = executions.iter().map(|e| e.duration).max()?;

    let count = executions.len();
    let durations: Vec<f64> = executions.iter().map(|e| e.duration as f64).collect();
    let (mean, std_dev) = mean_and_std(&durations);

    let mut ordered = executions.to_vec();
    ordered.sort_by_key(|e| e.start_time);

    Some(ExecutionStats {
        count,
        mean,
        std_dev,
        min,
        max,
        executions: ordered,
    })
}

/// Mean and population standard deviation of a non-empty slice
pub(crate) fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Execution statistics for every device and event in a record set
///
/// Records without a device are kept apart from named devices, so a real
/// device called `"default"` never merges with the implicit one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    /// device id -> event name -> statistics
    pub devices: BTreeMap<String, BTreeMap<String, ExecutionStats>>,
    /// event name -> statistics for records without a device
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub implicit_device: BTreeMap<String, ExecutionStats>,
}

/// One (device, event) group picked out by the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRanking {
    pub device: String,
    pub event: String,
    pub mean: f64,
}

/// Headline figures across every group of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSummary {
    pub total_executions: usize,
    /// Mean of the per-group means
    pub mean_of_means: f64,
    pub fastest: EventRanking,
    pub slowest: EventRanking,
}

impl TimingReport {
    /// Check if no group produced an execution
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.implicit_device.is_empty()
    }

    /// Number of devices with at least one execution
    pub fn device_count(&self) -> usize {
        self.devices.len() + usize::from(!self.implicit_device.is_empty())
    }

    /// Look up the statistics of one (device, event) group
    ///
    /// `None` selects the implicit device.
    pub fn get(&self, device: Option<&str>, event: &str) -> Option<&ExecutionStats> {
        match device {
            Some(device) => self.devices.get(device).and_then(|events| events.get(event)),
            None => self.implicit_device.get(event),
        }
    }

    /// Iterate over (device label, event, stats), implicit device first
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &ExecutionStats)> {
        let implicit = self
            .implicit_device
            .iter()
            .map(|(event, stats)| (DEFAULT_DEVICE, event.as_str(), stats));
        let named = self.devices.iter().flat_map(|(device, events)| {
            events
                .iter()
                .map(move |(event, stats)| (device.as_str(), event.as_str(), stats))
        });
        implicit.chain(named)
    }

    /// Derive the headline figures, `None` for an empty report
    pub fn summary(&self) -> Option<TimingSummary> {
        let rankings: Vec<EventRanking> = self
            .iter()
            .map(|(device, event, stats)| EventRanking {
                device: device.to_string(),
                event: event.to_string(),
                mean: stats.mean,
            })
            .collect();

        let fastest = rankings
            .iter()
            .min_by(|a, b| a.mean.total_cmp(&b.mean))?
            .clone();
        let slowest = rankings
            .iter()
            .max_by(|a, b| a.mean.total_cmp(&b.mean))?
            .clone();

        let total_executions = self.iter().map(|(_, _, stats)| stats.count).sum();
        let mean_of_means = rankings.iter().map(|r| r.mean).sum::<f64>() / rankings.len() as f64;

        Some(TimingSummary {
            total_executions,
            mean_of_means,
            fastest,
            slowest,
        })
    }
}

/// Extract and summarize executions for every device and event
pub fn analyze_execution_timing(records: &[ToggleRecord]) -> TimingReport {
    let mut report = TimingReport::default();

    for (key, executions) in extract_grouped(records) {
        let Some(stats) = compute_statistics(&executions) else {
            continue;
        };
        let events = match key.device_id {
            Some(device) => report.devices.entry(device).or_default(),
            None => &mut report.implicit_device,
        };
        events.insert(key.event_name, stats);
    }

    log::info!(
        "Execution timing: {} devices, {} groups",
        report.device_count(),
        report.iter().count()
    );
    report
}
