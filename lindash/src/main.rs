//! LinDash - synchronized time-series charts for LinDB dashboards.
//!
//! Mounts a group of demo charts fed by generated LinDB query results.
//! Hover and zoom are shared between charts of the group.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use iced::{Task, application};

use lindash::{LinDash, Settings};
use lindash_common::{DashboardConfig, default_config_path, init_tracing, load_config};

/// LinDash chart dashboard
#[derive(Parser, Debug)]
#[command(name = "lindash")]
#[command(about = "Synchronized canvas time-series charts for LinDB")]
struct Args {
    /// Path to configuration file (JSON5)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of charts to mount (overrides the config file)
    #[arg(short = 'n', long)]
    charts: Option<usize>,

    /// Share zoom between all charts of the group
    #[arg(long)]
    linked: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = resolve_config(args.config.as_deref())?;
    if let Some(charts) = args.charts {
        config.demo.charts = charts;
    }
    config.chart.validate().context("Invalid chart configuration")?;

    init_tracing(&config.logging)?;

    tracing::info!(charts = config.demo.charts, linked = args.linked, "Starting LinDash");

    let settings = Settings {
        config,
        linked: args.linked,
    };

    application(
        move || (LinDash::new(settings.clone()), Task::none()),
        LinDash::update,
        LinDash::view,
    )
    .title(LinDash::title)
    .subscription(LinDash::subscription)
    .theme(LinDash::theme)
    .run()
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}

/// Load the explicit config file, else the default one if present, else defaults.
fn resolve_config(path: Option<&std::path::Path>) -> anyhow::Result<DashboardConfig> {
    if let Some(path) = path {
        return load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.exists() => load_config(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        _ => Ok(DashboardConfig::default()),
    }
}
