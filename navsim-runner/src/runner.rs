//! Run orchestration: load inputs, simulate, compute metrics.
//!
//! Two entry points:
//! - `run_backtest()`: loads schedule, fees and Parquet data from a `RunConfig`. Used by the CLI.
//! - `run_with_providers()`: takes a loaded schedule and caller-supplied providers.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use navsim_core::data::{
    BenchmarkProvider, DataError, MarketDataProvider, ParquetBenchmark, ParquetMarketData,
    ScheduleError, TradingSchedule,
};
use navsim_core::engine::{BacktestEngine, RunResult};
use navsim_core::fees::{FeeConfig, FeeConfigError};
use navsim_core::EngineError;

use crate::config::{ConfigError, RunConfig, RunId};
use crate::metrics::PerformanceMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("schedule error: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("fee config error: {0}")]
    Fees(#[from] FeeConfigError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("no schedule days on or before {as_of}")]
    EmptySchedule { as_of: NaiveDate },
}

/// Benchmark inputs for a run: provider and index symbol.
pub type BenchmarkSource<'a> = (&'a dyn BenchmarkProvider, &'a str);

/// Everything a finished run hands to reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub run_id: RunId,
    pub name: Option<String>,
    pub as_of: NaiveDate,
    pub fees: FeeConfig,
    pub result: RunResult,
    /// `None` when the run produced fewer than two NAV observations.
    pub metrics: Option<PerformanceMetrics>,
    pub benchmark_symbol: Option<String>,
    pub benchmark: BTreeMap<NaiveDate, f64>,
}

/// Load every input named by `config` and run it.
///
/// `as_of` overrides the configured date; with neither, today's date is used.
pub fn run_backtest(
    config: &RunConfig,
    as_of: Option<NaiveDate>,
) -> Result<BacktestReport, RunError> {
    let as_of = as_of
        .or(config.backtest.as_of)
        .unwrap_or_else(|| Local::now().date_naive());

    let fees = FeeConfig::from_path(&config.fees.path)?;
    let schedule = TradingSchedule::from_csv_path(&config.data.schedule_path)?;
    log::info!(
        "loaded schedule {} ({} days)",
        config.data.schedule_path.display(),
        schedule.len()
    );

    let market = ParquetMarketData::new(&config.data.market_data_dir);
    let index = config
        .benchmark()
        .map(|(dir, symbol)| (ParquetBenchmark::new(dir), symbol));
    let benchmark = index
        .as_ref()
        .map(|(provider, symbol)| (provider as &dyn BenchmarkProvider, *symbol));

    run_with_providers(config, schedule, fees, &market, benchmark, as_of)
}

/// Run a loaded schedule against the given providers.
pub fn run_with_providers(
    config: &RunConfig,
    schedule: TradingSchedule,
    fees: FeeConfig,
    market: &dyn MarketDataProvider,
    benchmark: Option<BenchmarkSource<'_>>,
    as_of: NaiveDate,
) -> Result<BacktestReport, RunError> {
    config.validate()?;
    fees.validate()?;

    let total_days = schedule.len();
    let schedule = schedule.truncate_after(as_of);
    if schedule.is_empty() {
        return Err(RunError::EmptySchedule { as_of });
    }
    if schedule.len() < total_days {
        log::info!(
            "simulating {} of {} schedule days (as of {as_of})",
            schedule.len(),
            total_days
        );
    }

    let run_id = config.run_id(as_of, &fees)?;
    log::info!("run {run_id}: initial cash {:.2}", config.backtest.initial_cash);

    let result =
        BacktestEngine::new(&schedule, market, config.backtest.initial_cash, &fees).run()?;
    log::info!(
        "run {run_id}: final NAV {:.2} ({:+.2}%)",
        result.final_nav(),
        result.total_return() * 100.0
    );

    let closes = match benchmark {
        Some((provider, symbol)) => {
            let dates: Vec<NaiveDate> = result.equity_history.iter().map(|p| p.date).collect();
            provider.series(&dates, symbol)?
        }
        None => BTreeMap::new(),
    };
    let metrics = PerformanceMetrics::compute(
        &result.equity_history,
        Some(&closes),
        config.backtest.risk_free_rate,
    );

    Ok(BacktestReport {
        run_id,
        name: config.backtest.name.clone(),
        as_of,
        fees,
        result,
        metrics,
        benchmark_symbol: benchmark.map(|(_, symbol)| symbol.to_string()),
        benchmark: closes,
    })
}
