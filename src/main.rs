//! Netpulse - Entry Point
//!
//! Seeds the reference network, starts the background clock and prints a
//! health summary on a fixed period until Ctrl-C or the run limit.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use netpulse::core::error::{Result, SimError};
use netpulse::core::time::{ScaledTimeSource, SystemTimeSource, TimeSource};
use netpulse::{HealthSummary, SimulationClock, SimulationConfig, StateStore};

/// Run the network state simulation
#[derive(Parser, Debug)]
#[command(name = "netpulse")]
#[command(about = "Evolve a simulated telecom network in the background")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds per wall-clock second
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    /// Override the tick interval (wall seconds)
    #[arg(long)]
    tick_secs: Option<f64>,

    /// How often to print a health summary (wall seconds)
    #[arg(long, default_value_t = 30)]
    report_secs: u64,

    /// Stop after this many wall seconds
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Print summaries as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("netpulse=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(secs) = args.tick_secs {
        config.clock.tick_interval_secs = secs;
    }
    config.validate()?;
    if !(args.time_scale.is_finite() && args.time_scale > 0.0) {
        return Err(SimError::InvalidConfig(format!(
            "--time-scale must be a positive number, got {}",
            args.time_scale
        )));
    }

    let rt = Runtime::new()?;
    rt.block_on(run(args, config))
}

async fn run(args: Args, config: SimulationConfig) -> Result<()> {
    let start = Utc::now();
    let store = Arc::new(StateStore::new(config, start)?);

    let time: Arc<dyn TimeSource> = if (args.time_scale - 1.0).abs() < f64::EPSILON {
        Arc::new(SystemTimeSource)
    } else {
        Arc::new(ScaledTimeSource::new(start, args.time_scale))
    };

    tracing::info!(
        components = store.components()?.len(),
        regions = store.regions()?.len(),
        time_scale = args.time_scale,
        "Netpulse starting"
    );

    let clock = SimulationClock::start(Arc::clone(&store), time);

    let mut report = tokio::time::interval(Duration::from_secs(args.report_secs.max(1)));
    let limit = async {
        match args.duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(limit);

    loop {
        tokio::select! {
            _ = report.tick() => print_summary(&store.health_summary()?, args.json)?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, stopping");
                break;
            }
            _ = &mut limit => break,
        }
    }

    store.stop();
    let stats = clock.join().await?;
    print_summary(&store.health_summary()?, args.json)?;
    tracing::info!(
        applied = stats.applied,
        skipped = stats.skipped,
        failed = stats.failed,
        "Netpulse finished"
    );
    Ok(())
}

fn print_summary(summary: &HealthSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(summary)?);
        return Ok(());
    }

    println!(
        "[{}] components: {} ({} healthy), avg health {:.2}, active incidents: {}",
        summary.timestamp.format("%Y-%m-%d %H:%M:%S"),
        summary.total_components,
        summary.healthy_components,
        summary.average_health_score,
        summary.active_incidents,
    );
    for (region, load) in &summary.regions_status {
        println!("  {:<22} load {:>5.1}%", region.as_str(), load * 100.0);
    }
    Ok(())
}
