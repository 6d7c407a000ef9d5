//! NavSim Runner: run orchestration, metrics and reporting.
//!
//! This crate builds on `navsim-core` to provide:
//! - TOML run configuration with content-addressed run ids
//! - The load → simulate → measure pipeline
//! - Performance metrics (CAGR, Sharpe, Sortino, drawdown, benchmark-relative)
//! - Diagnostic and performance text reports
//! - Run artifacts (manifest, equity, per-day records, stuck events)

pub mod config;
pub mod metrics;
pub mod reporting;
pub mod runner;

pub use config::{ConfigError, RunConfig, RunId};
pub use metrics::{BenchmarkMetrics, PerformanceMetrics};
pub use reporting::{ArtifactManager, ArtifactPaths, RunManifest};
pub use runner::{run_backtest, run_with_providers, BacktestReport, RunError};
