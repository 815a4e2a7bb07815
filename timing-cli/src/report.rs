//! Report generation
//!
//! Renders an `AnalysisOutput` as a plain-text report with ASCII tables or as
//! JSON. Times are shown in microseconds in text reports and kept in
//! nanoseconds in JSON.

use anyhow::Result;
use std::fmt::Write;

use crate::analysis::AnalysisOutput;
use crate::config::OutputFormat;

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

fn us(ns: f64) -> f64 {
    ns / 1000.0
}

/// Render a report in the requested format
pub fn render(output: &AnalysisOutput, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Txt => Ok(render_txt(output)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(output)?),
    }
}

/// Render the plain-text report
pub fn render_txt(output: &AnalysisOutput) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_txt(&mut out, output);
    out
}

fn write_txt(out: &mut String, output: &AnalysisOutput) -> std::fmt::Result {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "  Hardware Timing Report: {}", output.source)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Generated: {}", output.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(
        out,
        "Records:   {} from {} device(s)\n",
        output.record_count, output.device_count
    )?;

    write_summary(out, output)?;
    write_execution_table(out, output)?;
    write_sync_table(out, output)?;
    write_propagation_table(out, output)?;
    Ok(())
}

fn write_summary(out: &mut String, output: &AnalysisOutput) -> std::fmt::Result {
    writeln!(out, "SUMMARY")?;
    writeln!(out, "{}", THIN_RULE)?;
    match &output.timing_summary {
        Some(summary) => {
            writeln!(out, "  Total executions:    {}", summary.total_executions)?;
            writeln!(out, "  Avg execution time:  {:.1} us", us(summary.mean_of_means))?;
            writeln!(
                out,
                "  Fastest event:       {} ({}): {:.1} us",
                summary.fastest.event,
                summary.fastest.device,
                us(summary.fastest.mean)
            )?;
            writeln!(
                out,
                "  Slowest event:       {} ({}): {:.1} us",
                summary.slowest.event,
                summary.slowest.device,
                us(summary.slowest.mean)
            )?;
        }
        None => writeln!(out, "  No execution data found")?,
    }
    if let Some(sync) = &output.sync_summary {
        writeln!(out, "  Sync pulses:         {}", sync.pulse_count)?;
        writeln!(out, "  Max sync skew:       {:.3} us", us(sync.overall_max_diff as f64))?;
        writeln!(out, "  Avg sync skew:       {:.3} us", us(sync.average_mean_diff))?;
    }
    if let Some(prop) = &output.propagation_summary {
        writeln!(out, "  Messages traced:     {}", prop.message_count)?;
        writeln!(out, "  Avg propagation:     {:.3} us", us(prop.mean_propagation_time))?;
        writeln!(out, "  Avg time per hop:    {:.3} us", us(prop.mean_time_per_hop))?;
    }
    writeln!(out)
}

fn write_execution_table(out: &mut String, output: &AnalysisOutput) -> std::fmt::Result {
    writeln!(out, "EXECUTION TIMING (us)")?;
    writeln!(out, "{}", THIN_RULE)?;
    writeln!(
        out,
        "  {:<12} {:<16} {:>6} {:>10} {:>10} {:>10} {:>10}",
        "Device", "Event", "Count", "Mean", "Std", "Min", "Max"
    )?;
    for (device, event, stats) in output.timing.iter() {
        writeln!(
            out,
            "  {:<12} {:<16} {:>6} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            device,
            event,
            stats.count,
            us(stats.mean),
            us(stats.std_dev),
            us(stats.min as f64),
            us(stats.max as f64)
        )?;
    }
    writeln!(out)
}

fn write_sync_table(out: &mut String, output: &AnalysisOutput) -> std::fmt::Result {
    if output.sync_pulses.is_empty() {
        return Ok(());
    }
    writeln!(out, "SYNCHRONICITY (us)")?;
    writeln!(out, "{}", THIN_RULE)?;
    writeln!(
        out,
        "  {:<12} {:>8} {:>10} {:>10} {:>10} {:>10}",
        "Sync ID", "Devices", "Max", "Min", "Mean", "Std"
    )?;
    for pulse in &output.sync_pulses {
        writeln!(
            out,
            "  {:<12} {:>8} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            pulse.correlation_id,
            pulse.device_count,
            us(pulse.max_diff as f64),
            us(pulse.min_diff as f64),
            us(pulse.mean_diff),
            us(pulse.std_diff)
        )?;
    }
    writeln!(out)
}

fn write_propagation_table(out: &mut String, output: &AnalysisOutput) -> std::fmt::Result {
    if output.propagation.is_empty() {
        return Ok(());
    }
    writeln!(out, "MESSAGE PROPAGATION (us)")?;
    writeln!(out, "{}", THIN_RULE)?;
    writeln!(
        out,
        "  {:<10} {:<12} {:<12} {:>5} {:>12} {:>12}",
        "Message", "From", "To", "Hops", "Time", "Per hop"
    )?;
    for message in &output.propagation {
        for hop in &message.hops {
            writeln!(
                out,
                "  {:<10} {:<12} {:<12} {:>5} {:>12.3} {:>12.3}",
                message.correlation_id,
                format!("{}@{}", hop.from_device, hop.from_position),
                format!("{}@{}", hop.to_device, hop.to_position),
                hop.hop_count,
                us(hop.propagation_time as f64),
                us(hop.time_per_hop)
            )?;
        }
    }
    writeln!(out)
}
