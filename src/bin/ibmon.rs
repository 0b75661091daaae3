//! ibmon - InfiniBand port bandwidth monitor.
//!
//! Usage:
//!   ibmon                          # all ACTIVE devices, 1s interval
//!   ibmon -d mlx5_0                # one device
//!   ibmon -d mlx5_0,mlx5_1 -i 0.5  # two devices, 500ms interval
//!   ibmon -d mlx5_0 --csv out.csv  # log per-tick rates

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use ibmon::collector::{RealFs, SYSFS_IB_BASE, enumerate_active_devices};
use ibmon::csv::CsvSink;
use ibmon::device::Device;
use ibmon::tui::{App, AppOptions, Units};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitsArg {
    Bits,
    Bytes,
}

impl From<UnitsArg> for Units {
    fn from(u: UnitsArg) -> Self {
        match u {
            UnitsArg::Bits => Units::Bits,
            UnitsArg::Bytes => Units::Bytes,
        }
    }
}

/// InfiniBand port bandwidth monitor.
#[derive(Parser)]
#[command(name = "ibmon", about = "InfiniBand port bandwidth monitor", version)]
struct Args {
    /// Devices to monitor, comma separated.
    /// Default: every device whose port 1 is ACTIVE.
    #[arg(short = 'd', long = "device", value_name = "DEV[,DEV...]")]
    device: Option<String>,

    /// Port number to monitor on each device.
    #[arg(short, long, default_value = "1")]
    port: u32,

    /// Sampling interval in seconds.
    #[arg(short, long, default_value = "1.0")]
    interval: f64,

    /// Display units for byte rates.
    #[arg(short, long, value_enum, default_value = "bits")]
    units: UnitsArg,

    /// Log per-tick rates to a CSV file (single device only).
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Append to the CSV file instead of truncating it.
    #[arg(long, requires = "csv")]
    csv_append: bool,

    /// Write the CSV header even when appending.
    #[arg(long, requires = "csv")]
    csv_headers: bool,

    /// Exit after this many seconds (0 = run until quit).
    #[arg(long, value_name = "SECS")]
    duration: Option<f64>,
}

/// Logs go to stderr so they never mix with the alternate-screen UI.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ibmon=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn usage_error(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    process::exit(2);
}

fn main() {
    let args = Args::parse();
    init_logging();

    if args.port == 0 {
        usage_error("port must be >= 1");
    }
    if !(args.interval > 0.0) {
        usage_error("interval must be positive");
    }
    if let Some(d) = args.duration
        && (d < 0.0 || d.is_nan())
    {
        usage_error("duration must be >= 0");
    }

    let fs = RealFs;
    let base = Path::new(SYSFS_IB_BASE);

    let names: Vec<String> = match &args.device {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        None => enumerate_active_devices(&fs, base),
    };
    if names.is_empty() {
        usage_error(&format!(
            "no active InfiniBand devices found under {}",
            SYSFS_IB_BASE
        ));
    }
    if args.csv.is_some() && names.len() > 1 {
        usage_error("--csv requires a single device");
    }

    let mut devices = Vec::with_capacity(names.len());
    for name in &names {
        match Device::open(&fs, base, name, args.port) {
            Ok(dev) => devices.push(dev),
            Err(e) => {
                eprintln!("Error: cannot monitor {} port {}: {}", name, args.port, e);
                process::exit(1);
            }
        }
    }

    let csv = args.csv.as_deref().and_then(|path| {
        match CsvSink::open(path, args.csv_append, args.csv_headers) {
            Ok(sink) => Some(sink),
            Err(e) => {
                eprintln!("Warning: cannot open {}: {}", path.display(), e);
                None
            }
        }
    });

    let stop = Arc::new(AtomicBool::new(false));
    let s = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        s.store(true, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let opts = AppOptions {
        interval: Duration::from_secs_f64(args.interval),
        units: args.units.into(),
        duration: args
            .duration
            .filter(|&d| d > 0.0)
            .map(Duration::from_secs_f64),
        csv,
    };
    if let Err(e) = App::new(fs, devices, stop, opts).run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
