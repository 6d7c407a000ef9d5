//! Run manifest export (JSON).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use navsim_core::fees::FeeConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::metrics::PerformanceMetrics;
use crate::runner::BacktestReport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub name: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub as_of: NaiveDate,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days_simulated: usize,
    pub initial_cash: f64,
    pub final_nav: f64,
    pub total_return: f64,
    pub fees: FeeConfig,
    pub benchmark_symbol: Option<String>,
    pub metrics: Option<PerformanceMetrics>,
}

impl RunManifest {
    pub fn from_report(report: &BacktestReport) -> Self {
        let result = &report.result;
        Self {
            run_id: report.run_id.clone(),
            name: report.name.clone(),
            timestamp: chrono::Utc::now(),
            as_of: report.as_of,
            start_date: result.start_date(),
            end_date: result.end_date(),
            days_simulated: result.daily_records.len(),
            initial_cash: result.initial_cash,
            final_nav: result.final_nav(),
            total_return: result.total_return(),
            fees: report.fees,
            benchmark_symbol: report.benchmark_symbol.clone(),
            metrics: report.metrics.clone(),
        }
    }
}

pub fn write_manifest(path: &Path, report: &BacktestReport) -> Result<()> {
    let manifest = RunManifest::from_report(report);
    let json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize run manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    Ok(())
}
