//! Standalone demo of the timing engine on a hand-written daisy chain
//!
//! Usage:
//!   cargo run -p timing-engine --example chain_timing

use timing_engine::{
    analyze_execution_timing, analyze_propagation, analyze_synchronicity, AnalysisConfig,
    ToggleRecord,
};

fn device(name: &str, pos: i64, event: &str, ts: i64, toggled: bool) -> ToggleRecord {
    ToggleRecord::new(event, ts, toggled)
        .with_device(name)
        .with_position(pos)
}

fn main() {
    env_logger::init();

    let mut records = vec![
        device("Device_1", 1, "GPIO_Init", 1000, true),
        device("Device_1", 1, "GPIO_Init", 1500, false),
        device("Device_2", 2, "ADC_Read", 4000, true),
        device("Device_2", 2, "ADC_Read", 6000, false),
    ];
    for (name, pos, ts) in [("Device_1", 1, 10000), ("Device_2", 2, 10050), ("Device_3", 3, 9980)] {
        records.push(device(name, pos, "Sync_Pulse", ts, true).with_correlation_id("SYNC_0"));
    }
    records.push(device("Device_1", 1, "Message_Send", 20000, true).with_correlation_id("MSG_0"));
    records.push(device("Device_3", 3, "Message_Receive", 25000, true).with_correlation_id("MSG_0"));

    let config = AnalysisConfig::new();

    println!("=== EXECUTION TIMING ===");
    for (dev, event, stats) in analyze_execution_timing(&records).iter() {
        println!("{:<10} {:<12} count={} mean={:.0} ns", dev, event, stats.count, stats.mean);
    }

    println!("\n=== SYNCHRONICITY ===");
    for pulse in analyze_synchronicity(&records, &config) {
        println!("{}: {} devices, max skew {} ns", pulse.correlation_id, pulse.device_count, pulse.max_diff);
        for pair in &pulse.pairwise {
            println!("  {}", pair);
        }
    }

    println!("\n=== PROPAGATION ===");
    for message in analyze_propagation(&records, &config) {
        for hop in &message.hops {
            println!("{}: {}", message.correlation_id, hop);
        }
    }
}
