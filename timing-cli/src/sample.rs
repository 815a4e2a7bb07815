//! Sample data generation
//!
//! Builds a reproducible daisy-chain capture for demos and smoke tests:
//! ordinary peripheral executions on every device, periodic sync pulses and
//! messages sent from the head of the chain.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};
use timing_engine::ToggleRecord;

/// Peripheral events with (mean, std dev) execution time in ns
const EVENT_PROFILES: [(&str, f64, f64); 5] = [
    ("GPIO_Init", 500.0, 100.0),
    ("ADC_Read", 2000.0, 300.0),
    ("UART_Send", 8000.0, 1000.0),
    ("Timer_ISR", 1200.0, 200.0),
    ("SPI_Transfer", 3000.0, 500.0),
];

const MIN_EXECUTION_NS: f64 = 100.0;
const MEAN_GAP_NS: f64 = 1000.0;
const SYNC_EVERY: usize = 10;
const MESSAGE_EVERY: usize = 5;
const SYNC_JITTER_NS: f64 = 1500.0;
const HOP_LATENCY_NS: (f64, f64) = (2500.0, 200.0);
const EDGE_WIDTH_NS: i64 = 200;

/// Shape of the generated capture
#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub devices: usize,
    pub cycles: usize,
    pub seed: u64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            devices: 5,
            cycles: 200,
            seed: 42,
        }
    }
}

struct Generator {
    rng: StdRng,
    records: Vec<ToggleRecord>,
    now: i64,
    /// Execution time distribution per `EVENT_PROFILES` entry
    durations: Vec<(&'static str, Normal<f64>)>,
    gap: Exp<f64>,
    sync_jitter: Normal<f64>,
    hop_latency: Normal<f64>,
}

impl Generator {
    fn new(seed: u64) -> Result<Self> {
        let durations = EVENT_PROFILES
            .iter()
            .map(|&(event, mean, std_dev)| -> Result<_> { Ok((event, Normal::new(mean, std_dev)?)) })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            records: Vec::new(),
            now: 0,
            durations,
            gap: Exp::new(1.0 / MEAN_GAP_NS)?,
            sync_jitter: Normal::new(0.0, SYNC_JITTER_NS)?,
            hop_latency: Normal::new(HOP_LATENCY_NS.0, HOP_LATENCY_NS.1)?,
        })
    }

    fn gap(&mut self) -> i64 {
        self.gap.sample(&mut self.rng) as i64
    }

    fn edge(&mut self, event: &str, device: usize, ts: i64, toggled: bool, id: Option<&str>) {
        let mut record = ToggleRecord::new(event, ts, toggled)
            .with_device(device_name(device))
            .with_position(device as i64 + 1);
        if let Some(id) = id {
            record = record.with_correlation_id(id);
        }
        self.records.push(record);
    }

    fn pulse(&mut self, event: &str, device: usize, start: i64, id: Option<&str>) {
        self.edge(event, device, start, true, id);
        self.edge(event, device, start + EDGE_WIDTH_NS, false, id);
    }

    fn executions(&mut self, devices: usize) {
        let mut latest = self.now;
        for device in 0..devices {
            let (event, duration) = self.durations[self.rng.gen_range(0..self.durations.len())];
            let start = self.now + self.gap();
            let duration = duration.sample(&mut self.rng).max(MIN_EXECUTION_NS) as i64;
            self.edge(event, device, start, true, None);
            self.edge(event, device, start + duration, false, None);
            latest = latest.max(start + duration);
        }
        self.now = latest + self.gap();
    }

    fn sync_pulse(&mut self, devices: usize, index: usize) {
        let id = format!("SYNC_{}", index);
        let base = self.now + 5 * SYNC_JITTER_NS as i64;
        for device in 0..devices {
            let start = base + self.sync_jitter.sample(&mut self.rng) as i64;
            self.pulse("Sync_Pulse", device, start, Some(&id));
        }
        self.now = base + 10 * SYNC_JITTER_NS as i64;
    }

    fn message(&mut self, devices: usize, index: usize) {
        let id = format!("MSG_{}", index);
        let sent = self.now;
        self.pulse("Message_Send", 0, sent, Some(&id));

        let mut arrival = sent;
        for device in 1..devices {
            arrival += self.hop_latency.sample(&mut self.rng).max(1.0) as i64;
            self.pulse("Message_Receive", device, arrival, Some(&id));
        }
        self.now = arrival + EDGE_WIDTH_NS + 1000;
    }
}

/// Display name of the device at a zero-based chain index
pub fn device_name(index: usize) -> String {
    format!("Device_{}", index + 1)
}

/// Generate a capture sorted by timestamp
pub fn generate_sample_data(spec: &SampleSpec) -> Result<Vec<ToggleRecord>> {
    let mut generator = Generator::new(spec.seed)?;

    for cycle in 0..spec.cycles {
        generator.executions(spec.devices);
        if cycle % SYNC_EVERY == 0 {
            generator.sync_pulse(spec.devices, cycle / SYNC_EVERY);
        }
        if cycle % MESSAGE_EVERY == 0 && spec.devices > 1 {
            generator.message(spec.devices, cycle / MESSAGE_EVERY);
        }
    }

    let mut records = generator.records;
    records.sort_by_key(|r| r.timestamp);
    log::debug!(
        "Generated {} sample records for {} devices",
        records.len(),
        spec.devices
    );
    Ok(records)
}
