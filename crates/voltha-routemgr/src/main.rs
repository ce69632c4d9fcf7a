//! routemgrd entry point.
//!
//! Reads a topology snapshot, computes the routes of its logical device and
//! logs the outcome. Exits non-zero only on structural errors; unresolved
//! devices are logged and leave their pairs without routes.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use voltha_routemgr::{
    init_logging, run, RouteMgrConfig, RunMode, RunOptions, TopologyFile, DEFAULT_CONFIG_PATH,
};

/// VOLTHA logical device route manager
#[derive(Parser, Debug)]
#[command(name = "routemgrd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Topology snapshot (JSON)
    #[arg(short = 't', long)]
    topology: PathBuf,

    /// Configuration file (TOML)
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Add logical ports one at a time instead of in one batch
    #[arg(short = 'i', long)]
    incremental: bool,

    /// Overall lookup deadline in milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Log level, overrides the configuration file
    #[arg(short = 'l', long)]
    log_level: Option<String>,

    /// Print topology and routes to stdout when done
    #[arg(short = 'd', long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = RouteMgrConfig::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    init_logging(&config.logging)?;

    let topology = TopologyFile::from_file(&args.topology)
        .with_context(|| format!("loading {}", args.topology.display()))?;

    let options = RunOptions {
        mode: if args.incremental {
            RunMode::Incremental
        } else {
            RunMode::Bulk
        },
        deadline: args.deadline_ms.map(Duration::from_millis),
    };

    let summary = run(&topology, &config, &options)
        .await
        .context("computing routes")?;

    let report = &summary.report;
    info!(
        routes = report.routes_installed,
        lookups = report.lookups,
        skipped = report.skipped.len(),
        "Route computation finished"
    );
    for (device_id, err) in &report.lookup_failures {
        warn!(device_id = %device_id, %err, "Device unresolved");
    }

    if args.dump {
        print!("{}", summary.graph.dump().await);
    } else {
        summary.graph.print().await;
    }
    Ok(())
}
