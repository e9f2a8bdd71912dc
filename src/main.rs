use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use drivetrain_zenoh_runtime::config::{DrivetrainConfig, LOOP_HZ};

/// Differential drivetrain runtime: drive commands in, measured telemetry out
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON drivetrain config (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Control loop frequency in Hz
    #[arg(long, default_value_t = LOOP_HZ, value_parser = clap::value_parser!(u64).range(1..=1000))]
    loop_hz: u64,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init(); // installs the subscriber globally

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DrivetrainConfig::load(path),
        None => {
            info!("No config given, using defaults");
            Ok(DrivetrainConfig::default())
        }
    };

    let drivetrain = match config.and_then(|c| c.build()) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = drivetrain_zenoh_runtime::runtime::run(drivetrain, args.loop_hz).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
