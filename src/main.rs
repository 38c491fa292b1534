//! memwalk command line

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use memwalk::config::{validate_config, Config, ConfigLoader, FanOutMode, DEFAULT_CONFIG_PATH};
use memwalk::memory::scanner::ScanTiming;
use memwalk::{MemoryError, OsAccess, ProcessInfo, WalkOptions, WalkReport};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "memwalk")]
#[command(about = "Walk a process's address space and time sequential against concurrent reads")]
#[command(version)]
struct Args {
    /// Executable name of the target process (e.g. notepad.exe)
    process_name: String,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Scans per strategy in the timing comparison
    #[arg(short, long)]
    iterations: Option<u32>,

    /// How the concurrent strategy spreads reads over threads
    #[arg(long, value_enum)]
    fan_out: Option<FanOutArg>,

    /// Worker count for the pooled fan-out
    #[arg(long)]
    threads: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FanOutArg {
    Unbounded,
    Pooled,
}

impl From<FanOutArg> for FanOutMode {
    fn from(arg: FanOutArg) -> Self {
        match arg {
            FanOutArg::Unbounded => FanOutMode::Unbounded,
            FanOutArg::Pooled => FanOutMode::Pooled,
        }
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = ConfigLoader::new(&args.config)
        .load_or_default()
        .with_context(|| format!("loading {}", args.config.display()))?;

    if let Some(iterations) = args.iterations {
        config.scanner.timing_iterations = iterations;
    }
    if let Some(fan_out) = args.fan_out {
        config.scanner.fan_out = fan_out.into();
    }
    if let Some(threads) = args.threads {
        config.scanner.max_threads = threads;
    }

    validate_config(&config)?;
    Ok(config)
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_timing(timing: &ScanTiming) {
    println!(
        "{} read time: {:?} ({} iterations, {:?} per scan)",
        timing.strategy,
        timing.elapsed,
        timing.iterations,
        timing.per_iteration()
    );
}

fn print_opened(process: &ProcessInfo) {
    println!(
        "[+] Successfully opened {}. PID: {}.",
        process.name, process.pid
    );
}

fn print_report(report: &WalkReport) {
    println!("[+] Address space: {}", report.bounds);
    if let Some(error) = &report.enumeration_error {
        println!("[-] {}", error);
    }
    println!(
        "[+] Regions: {} total, {} readable, {} readable bytes",
        report.region_count, report.readable_count, report.readable_bytes
    );

    print_timing(&report.timing.sequential);
    print_timing(&report.timing.concurrent);
    if let Some(speedup) = report.timing.speedup() {
        println!("[+] Concurrent speedup: {:.2}x", speedup);
    }
}

fn run<A: OsAccess>(api: &A, args: &Args, config: &Config) -> Result<ExitCode> {
    info!(backend = api.name(), target = %args.process_name, "Starting walk");

    let options = WalkOptions {
        fan_out: config.scanner.fan_out(),
        iterations: config.scanner.timing_iterations,
    };

    let json = args.json;
    let walked = memwalk::walk_with(api, &args.process_name, options, |process| {
        if !json {
            print_opened(process);
        }
    });
    let report = match walked {
        Ok(report) => report,
        Err(MemoryError::ProcessNotFound(name)) => {
            eprintln!(
                "[-] Unable to open {}. You might need more permissions or the target process might not exist.",
                name
            );
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => {
            eprintln!("[-] {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(any(windows, target_os = "linux"))]
fn run_native(args: &Args, config: &Config) -> Result<ExitCode> {
    run(&memwalk::os::native(), args, config)
}

#[cfg(not(any(windows, target_os = "linux")))]
fn run_native(_args: &Args, _config: &Config) -> Result<ExitCode> {
    Err(MemoryError::UnsupportedPlatform(std::env::consts::OS.to_string()).into())
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&config);

    info!("memwalk v{}", memwalk::core::VERSION);
    run_native(&args, &config)
}
