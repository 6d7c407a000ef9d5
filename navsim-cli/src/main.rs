//! NavSim CLI: run backtests and inspect their inputs.
//!
//! Commands:
//! - `run`: simulate a schedule from a TOML run config and write artifacts
//! - `schedule`: summarize a schedule CSV (day types, date range, symbols)
//! - `fees`: validate a fee JSON file and print the schedules

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use navsim_core::data::TradingSchedule;
use navsim_core::engine::DayType;
use navsim_core::fees::FeeConfig;
use navsim_runner::reporting::{DiagnosticReportGenerator, PerformanceReportGenerator};
use navsim_runner::{run_backtest, ArtifactManager, RunConfig};

#[derive(Parser)]
#[command(
    name = "navsim",
    about = "NavSim CLI: daily A-share schedule backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest from a TOML config file.
    Run {
        /// Path to the run config.
        #[arg(long)]
        config: PathBuf,

        /// Last day to simulate (YYYY-MM-DD). Overrides the config; defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// Artifact directory. Overrides `[output] dir`.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Summarize a schedule CSV.
    Schedule {
        #[arg(long)]
        path: PathBuf,
    },
    /// Validate a fee file and print its schedules.
    Fees {
        #[arg(long)]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            as_of,
            output_dir,
        } => run_cmd(&config, as_of.as_deref(), output_dir),
        Commands::Schedule { path } => schedule_cmd(&path),
        Commands::Fees { path } => fees_cmd(&path),
    }
}

fn run_cmd(config_path: &Path, as_of: Option<&str>, output_dir: Option<PathBuf>) -> Result<()> {
    let config = RunConfig::from_path(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let as_of = as_of
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("--as-of must be YYYY-MM-DD")?;

    let report = run_backtest(&config, as_of)?;

    println!("{}", DiagnosticReportGenerator.generate(&report.result));
    if let Some(metrics) = &report.metrics {
        println!("{}", PerformanceReportGenerator.generate(metrics));
    }

    let output_dir = output_dir.unwrap_or_else(|| config.output.dir.clone());
    let paths = ArtifactManager::new(&output_dir)?.save_run(&report)?;
    println!("Artifacts saved to: {}", paths.run_dir.display());

    Ok(())
}

fn schedule_cmd(path: &Path) -> Result<()> {
    let schedule = TradingSchedule::from_csv_path(path)
        .with_context(|| format!("loading {}", path.display()))?;

    let (mut buy, mut hold, mut sell) = (0usize, 0usize, 0usize);
    let mut symbols = BTreeSet::new();
    for day in schedule.days() {
        match DayType::classify(day.first_trading_day, day.last_trading_day, day.date)? {
            DayType::Buy => buy += 1,
            DayType::Hold => hold += 1,
            DayType::Sell => sell += 1,
        }
        symbols.extend(day.symbols());
    }

    let range = match (schedule.first_date(), schedule.last_date()) {
        (Some(first), Some(last)) => format!("{first} .. {last}"),
        _ => "empty".to_string(),
    };
    println!("Schedule:  {}", path.display());
    println!("Range:     {range}");
    println!("Days:      {} ({buy} buy, {hold} hold, {sell} sell)", schedule.len());
    println!("Symbols:   {}", symbols.len());
    Ok(())
}

fn fees_cmd(path: &Path) -> Result<()> {
    let fees =
        FeeConfig::from_path(path).with_context(|| format!("loading {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&fees)?);
    println!(
        "Buy base rate {:.7}, sell base rate {:.7}, daily operating rate {:.7}",
        fees.buy.base_rate(),
        fees.sell.base_rate(),
        fees.operational.daily_operating_rate()
    );
    Ok(())
}
