//! skywatch: alert on aircraft inside watch points from a live aircraft.json feed.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, error, info};

use skywatch_core::config::{self, Config};
use skywatch_core::{aggregate_with_stats, AlertReport, Snapshot};

mod feed;
mod notification;
mod report;

use notification::NotifierGroup;

#[derive(Parser)]
#[command(
    name = "skywatch",
    version,
    about = "Geofence alerts for ADS-B aircraft feeds"
)]
struct Cli {
    /// Config file path (default: ~/.skywatch/config.yaml)
    #[arg(short, long, global = true, env = "SKYWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the feed, report matches, and send notifications
    Check {
        /// Report only, do not notify
        #[arg(long)]
        no_notify: bool,

        /// Force JSON output on
        #[arg(long)]
        json: bool,

        /// Force table output on
        #[arg(long)]
        table: bool,
    },

    /// Evaluate a saved aircraft.json snapshot (never notifies)
    Eval {
        /// Path to snapshot file, or - for stdin
        snapshot: PathBuf,

        /// Force JSON output on
        #[arg(long)]
        json: bool,

        /// Force table output on
        #[arg(long)]
        table: bool,
    },

    /// Load and validate the config, then print a summary
    Validate,

    /// Write a sample config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let path = cli.config.unwrap_or_else(config::config_file);

    match cli.command {
        Commands::Check {
            no_notify,
            json,
            table,
        } => cmd_check(&path, no_notify, json, table).await,
        Commands::Eval {
            snapshot,
            json,
            table,
        } => cmd_eval(&path, &snapshot, json, table),
        Commands::Validate => cmd_validate(&path),
        Commands::Init { force } => cmd_init(&path, force),
    }
}

fn load(path: &Path) -> Option<Config> {
    match config::load_config(path) {
        Ok(c) => {
            debug!(
                "Loaded {}: {} watch point(s), {} target group(s), units {}",
                path.display(),
                c.watch_points.len(),
                c.targets.len(),
                c.units
            );
            Some(c)
        }
        Err(e) => {
            error!("{e}");
            None
        }
    }
}

/// Aggregate and print according to config plus CLI overrides.
fn evaluate_and_report(config: &Config, snapshot: &Snapshot, json: bool, table: bool) -> AlertReport {
    let (report, stats) = aggregate_with_stats(&config.watch_points, &snapshot.aircraft, config.units);
    info!(
        "{} aircraft evaluated ({} skipped), {} watch point(s) with alerts",
        stats.evaluated,
        stats.skipped,
        report.len()
    );

    if table || config.output.table {
        report::print_table(&report, config.units);
    }
    if json || config.output.json {
        report::print_json(&report);
    }
    report
}

async fn cmd_check(path: &Path, no_notify: bool, json: bool, table: bool) -> ExitCode {
    let config = match load(path) {
        Some(c) => c,
        None => return ExitCode::FAILURE,
    };

    let snapshot = match feed::fetch_snapshot(
        &config.feed.url,
        config.feed.timeout_secs,
        config.feed.cache_bust,
    )
    .await
    {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let report = evaluate_and_report(&config, &snapshot, json, table);

    if no_notify || !config.notify {
        debug!("Notifications disabled");
        return ExitCode::SUCCESS;
    }

    let client = match notification::http_client() {
        Ok(c) => c,
        Err(e) => {
            error!("cannot build notification client: {e}");
            return ExitCode::FAILURE;
        }
    };
    let summary = notification::dispatch(&config, &report, |target| {
        NotifierGroup::from_target(target, &client)
    })
    .await;
    info!(
        "{} message(s) rendered, {} delivered, {} group(s) with template errors",
        summary.messages, summary.deliveries, summary.template_errors
    );

    ExitCode::SUCCESS
}

fn cmd_eval(path: &Path, snapshot: &Path, json: bool, table: bool) -> ExitCode {
    let config = match load(path) {
        Some(c) => c,
        None => return ExitCode::FAILURE,
    };

    let snapshot = match feed::read_snapshot(snapshot) {
        Ok(s) => s,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    evaluate_and_report(&config, &snapshot, json, table);
    ExitCode::SUCCESS
}

fn cmd_validate(path: &Path) -> ExitCode {
    let config = match load(path) {
        Some(c) => c,
        None => return ExitCode::FAILURE,
    };

    println!();
    println!("Config: {}", path.display());
    println!("  Feed:   {}", config.feed.url);
    println!("  Units:  {}", config.units);
    println!("  Notify: {}", config.notify);
    println!();
    for wp in &config.watch_points {
        let (lat, lon) = wp.center();
        println!(
            "  {} ({}): ({lat}, {lon}) r={} {}, alt {}..{} ft, {} pattern(s)",
            wp.name(),
            wp.friendly_name(),
            wp.radius_limit(),
            config.units,
            wp.altitude_low(),
            wp.altitude_high(),
            wp.pattern_count()
        );
    }
    for target in &config.targets {
        let active = config.active_targets().any(|t| t.name == target.name);
        println!(
            "  targets {}: {} url(s){}",
            target.name,
            target.urls.len(),
            if active { "" } else { " (no matching watch point)" }
        );
    }
    println!();
    ExitCode::SUCCESS
}

fn cmd_init(path: &Path, force: bool) -> ExitCode {
    match config::write_sample(path, force) {
        Ok(()) => {
            println!("Wrote sample config to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
