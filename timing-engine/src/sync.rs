//! Synchronicity analysis
//!
//! Measures cross-device skew of sync pulses: every device should raise the
//! sync event at the same instant for a given sync correlation id.

use crate::config::AnalysisConfig;
use crate::stats::mean_and_std;
use crate::types::{Nanos, PairwiseDiff, SyncPulse, ToggleRecord, DEFAULT_DEVICE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compute the skew of every sync pulse in the record set
///
/// Only start edges of `config.sync_event` with a sync-class correlation id
/// take part. If a device reports several start edges for one pulse, the
/// latest by timestamp wins. Pulses seen by fewer than two devices are
/// skipped. Results are ordered by correlation id.
pub fn analyze_synchronicity(records: &[ToggleRecord], config: &AnalysisConfig) -> Vec<SyncPulse> {
    let mut edges: Vec<(&str, &ToggleRecord)> = records
        .iter()
        .filter(|r| r.toggled && r.event_name == config.sync_event)
        .filter_map(|r| {
            let id = r.correlation_id.as_deref()?;
            config.is_sync_id(id).then_some((id, r))
        })
        .collect();
    edges.sort_by_key(|(_, r)| r.timestamp);

    // Keyed on the device id itself so the implicit device stays distinct
    let mut pulses: BTreeMap<&str, BTreeMap<Option<&str>, Nanos>> = BTreeMap::new();
    for (id, record) in edges {
        pulses
            .entry(id)
            .or_default()
            .insert(record.device_id.as_deref(), record.timestamp);
    }

    let results: Vec<SyncPulse> = pulses
        .into_iter()
        .filter_map(|(id, device_times)| {
            if device_times.len() < 2 {
                log::debug!("Skipping sync pulse {}: only one device reported", id);
                return None;
            }
            Some(build_pulse(id, device_times))
        })
        .collect();

    log::info!("Synchronicity: {} sync pulses analyzed", results.len());
    results
}

fn build_pulse(id: &str, device_times: BTreeMap<Option<&str>, Nanos>) -> SyncPulse {
    let device_times: Vec<(String, Nanos)> = device_times
        .into_iter()
        .map(|(device, ts)| (device.unwrap_or(DEFAULT_DEVICE).to_string(), ts))
        .collect();

    let mut pairwise = Vec::new();
    for (i, (device_a, time_a)) in device_times.iter().enumerate() {
        for (device_b, time_b) in &device_times[i + 1..] {
            pairwise.push(PairwiseDiff {
                device_a: device_a.clone(),
                device_b: device_b.clone(),
                diff: skew(*time_a, *time_b),
            });
        }
    }

    let diffs: Vec<f64> = pairwise.iter().map(|p| p.diff as f64).collect();
    let (mean_diff, std_diff) = mean_and_std(&diffs);

    SyncPulse {
        correlation_id: id.to_string(),
        device_count: device_times.len(),
        max_diff: pairwise.iter().map(|p| p.diff).max().unwrap_or(0),
        min_diff: pairwise.iter().map(|p| p.diff).min().unwrap_or(0),
        mean_diff,
        std_diff,
        device_times,
        pairwise,
    }
}

/// Absolute difference of two timestamps, saturating at `Nanos::MAX`
fn skew(a: Nanos, b: Nanos) -> Nanos {
    Nanos::try_from(a.abs_diff(b)).unwrap_or(Nanos::MAX)
}

/// Aggregate skew across all analyzed sync pulses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub pulse_count: usize,
    /// Largest skew seen in any pulse
    pub overall_max_diff: Nanos,
    /// Average of the per-pulse mean skews
    pub average_mean_diff: f64,
}

/// Summarize a set of sync pulses, `None` if there are none
pub fn summarize_sync(pulses: &[SyncPulse]) -> Option<SyncSummary> {
    let overall_max_diff = pulses.iter().map(|p| p.max_diff).max()?;
    let average_mean_diff =
        pulses.iter().map(|p| p.mean_diff).sum::<f64>() / pulses.len() as f64;

    Some(SyncSummary {
        pulse_count: pulses.len(),
        overall_max_diff,
        average_mean_diff,
    })
}
