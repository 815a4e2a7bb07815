//! Analysis pipeline
//!
//! Runs every engine analysis over one immutable record snapshot. Snapshots
//! are independent, so several files are analyzed in parallel, and within a
//! snapshot the analyses share the same borrowed slice.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use timing_engine::{
    analyze_execution_timing, analyze_propagation, analyze_synchronicity, summarize_propagation,
    summarize_sync, AnalysisConfig, MessagePropagation, PropagationSummary, SyncPulse,
    SyncSummary, TimingReport, TimingSummary, ToggleRecord,
};

use crate::ingest;

/// Everything derived from one record snapshot
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    /// File path or "sample"
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub device_count: usize,
    pub timing: TimingReport,
    pub timing_summary: Option<TimingSummary>,
    pub sync_pulses: Vec<SyncPulse>,
    pub sync_summary: Option<SyncSummary>,
    pub propagation: Vec<MessagePropagation>,
    pub propagation_summary: Option<PropagationSummary>,
}

/// Analyze one snapshot
pub fn analyze_snapshot(
    source: impl Into<String>,
    records: &[ToggleRecord],
    config: &AnalysisConfig,
) -> AnalysisOutput {
    let source = source.into();
    log::info!("Analyzing {} ({} records)", source, records.len());

    let (timing, (sync_pulses, propagation)) = rayon::join(
        || analyze_execution_timing(records),
        || {
            rayon::join(
                || analyze_synchronicity(records, config),
                || analyze_propagation(records, config),
            )
        },
    );

    let mut devices: Vec<Option<&str>> = records.iter().map(|r| r.device_id.as_deref()).collect();
    devices.sort_unstable();
    devices.dedup();

    AnalysisOutput {
        generated_at: Utc::now(),
        record_count: records.len(),
        device_count: devices.len(),
        timing_summary: timing.summary(),
        sync_summary: summarize_sync(&sync_pulses),
        propagation_summary: summarize_propagation(&propagation),
        source,
        timing,
        sync_pulses,
        propagation,
    }
}

/// Load and analyze several files in parallel
///
/// Results keep the order of `paths`; a file that fails to load does not
/// stop the others.
pub fn analyze_files(paths: &[PathBuf], config: &AnalysisConfig) -> Vec<Result<AnalysisOutput>> {
    paths
        .par_iter()
        .map(|path| {
            let records = ingest::load_csv(path)?;
            Ok(analyze_snapshot(path.display().to_string(), &records, config))
        })
        .collect()
}
