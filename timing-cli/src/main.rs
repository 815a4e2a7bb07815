//! Hardware Timing Analytics CLI Application
//!
//! This is the command-line front end for the timing engine.
//! It uses the timing-engine library and adds:
//! - CSV ingestion and validation
//! - TOML configuration
//! - Sample data generation
//! - Parallel multi-file analysis
//! - Report generation (TXT/JSON)

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use timing_engine::AnalysisConfig;

mod analysis;
mod config;
mod ingest;
mod report;
mod sample;

use config::{AppConfig, OutputFormat};

/// Hardware Timing Analytics - Execution, sync and propagation timing
#[derive(Parser, Debug)]
#[command(name = "timing-cli")]
#[command(about = "Analyze hardware signal-toggle captures (CSV)", long_about = None)]
#[command(version)]
struct Args {
    /// CSV capture(s) to analyze (can be repeated)
    #[arg(short, long, value_name = "FILE")]
    input: Vec<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Analyze generated sample data
    #[arg(long)]
    sample: bool,

    /// Write generated sample data as CSV and exit
    #[arg(long, value_name = "FILE")]
    write_sample: Option<PathBuf>,

    /// Number of devices in generated sample data
    #[arg(long, value_name = "COUNT", default_value_t = 5)]
    sample_devices: usize,

    /// Report format (overrides config)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Event name of sync pulses
    #[arg(long, value_name = "NAME")]
    sync_event: Option<String>,

    /// Correlation id prefix of sync pulses
    #[arg(long, value_name = "PREFIX")]
    sync_prefix: Option<String>,

    /// Event name of message sends
    #[arg(long, value_name = "NAME")]
    send_event: Option<String>,

    /// Event name of message receives
    #[arg(long, value_name = "NAME")]
    receive_event: Option<String>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Hardware Timing CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using timing engine v{}", timing_engine::VERSION);

    let app_config = resolve_config(&args)?;
    let format = args.format.unwrap_or(app_config.output.format);
    let sample_spec = sample::SampleSpec {
        devices: args.sample_devices,
        ..Default::default()
    };

    if let Some(path) = &args.write_sample {
        let records = sample::generate_sample_data(&sample_spec)?;
        let file = fs::File::create(path)
            .with_context(|| format!("Failed to create sample file: {:?}", path))?;
        ingest::write_csv(&records, io::BufWriter::new(file))?;
        log::info!("Wrote {} sample records to {:?}", records.len(), path);
        return Ok(());
    }

    let mut inputs = args.input.clone();
    inputs.extend(app_config.input.files.iter().cloned());

    if args.sample {
        let records = sample::generate_sample_data(&sample_spec)?;
        let output = analysis::analyze_snapshot("sample", &records, &app_config.analysis);
        emit(&report::render(&output, format)?, args.output.as_deref())?;
    } else if !inputs.is_empty() {
        analyze_inputs(&inputs, &app_config, format, args.output.as_deref())?;
    } else {
        // No arguments - show help
        println!("Hardware Timing Analytics - No input specified");
        println!("\nQuick Start:");
        println!("  timing-cli --input capture.csv");
        println!("  timing-cli --sample --format json");
        println!("\nFor advanced features:");
        println!("  timing-cli --config config.toml");
        println!("\nUse --help for more options");
    }

    Ok(())
}

/// Merge the config file (if any) with command-line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    let overrides: &mut AnalysisConfig = &mut config.analysis;
    if let Some(name) = &args.sync_event {
        overrides.sync_event = name.clone();
    }
    if let Some(prefix) = &args.sync_prefix {
        overrides.sync_prefix = prefix.clone();
    }
    if let Some(name) = &args.send_event {
        overrides.send_event = name.clone();
    }
    if let Some(name) = &args.receive_event {
        overrides.receive_event = name.clone();
    }
    overrides.validate()?;

    log::debug!("Analysis configuration: {:?}", config.analysis);
    Ok(config)
}

/// Analyze every input file and write the reports
fn analyze_inputs(
    inputs: &[PathBuf],
    config: &AppConfig,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let results = analysis::analyze_files(inputs, &config.analysis);

    let mut failures = 0;
    let mut reports = Vec::new();
    for (path, result) in inputs.iter().zip(results) {
        match result {
            Ok(analysis_output) => reports.push((path, report::render(&analysis_output, format)?)),
            Err(e) => {
                failures += 1;
                log::error!("{:#}", e);
            }
        }
    }

    if let Some(dir) = &config.output.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
        for (path, text) in &reports {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("report");
            let target = dir.join(format!("{}.{}", stem, format.extension()));
            fs::write(&target, text)
                .with_context(|| format!("Failed to write report: {:?}", target))?;
            log::info!("Report written: {:?}", target);
        }
    } else {
        let joined: Vec<String> = reports.into_iter().map(|(_, text)| text).collect();
        emit(&joined.join("\n"), output)?;
    }

    if failures > 0 {
        bail!("{} of {} input file(s) could not be analyzed", failures, inputs.len());
    }
    Ok(())
}

/// Write a report to a file or stdout
fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write report: {:?}", path))?;
            log::info!("Report written: {:?}", path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
