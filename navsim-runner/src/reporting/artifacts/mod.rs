//! Artifact manager for persisting run outputs.

mod equity;
mod manifest;
mod records;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::reports::{DiagnosticReportGenerator, PerformanceReportGenerator};
use crate::runner::BacktestReport;

pub use manifest::RunManifest;

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub equity_csv: PathBuf,
    pub equity_parquet: PathBuf,
    pub daily_records_csv: PathBuf,
    pub stuck_events_csv: PathBuf,
    pub diagnostics_txt: PathBuf,
    /// Absent when the run has too little history for metrics.
    pub performance_txt: Option<PathBuf>,
}

/// Manages writing all artifacts for a run.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .context("Failed to create artifact output directory")?;
        Ok(Self { output_dir })
    }

    /// Save complete run artifacts under `{output_dir}/{run_id}/`.
    pub fn save_run(&self, report: &BacktestReport) -> Result<ArtifactPaths> {
        let run_dir = self.output_dir.join(&report.run_id);
        std::fs::create_dir_all(&run_dir).context("Failed to create run artifact directory")?;
        let result = &report.result;

        let manifest_path = run_dir.join("manifest.json");
        manifest::write_manifest(&manifest_path, report)?;

        let equity_csv = run_dir.join("equity.csv");
        let equity_parquet = run_dir.join("equity.parquet");
        equity::write_equity_csv(&equity_csv, &result.equity_history)?;
        equity::write_equity_parquet(&equity_parquet, &result.equity_history)?;

        let daily_records_csv = run_dir.join("daily_records.csv");
        records::write_daily_records_csv(&daily_records_csv, &result.daily_records)?;

        let stuck_events_csv = run_dir.join("stuck_events.csv");
        records::write_stuck_events_csv(&stuck_events_csv, &result.diagnostics)?;

        let diagnostics_txt = run_dir.join("diagnostics.txt");
        write_text(&diagnostics_txt, &DiagnosticReportGenerator.generate(result))?;

        let performance_txt = match &report.metrics {
            Some(metrics) => {
                let path = run_dir.join("performance.txt");
                write_text(&path, &PerformanceReportGenerator.generate(metrics))?;
                Some(path)
            }
            None => {
                log::warn!("run {}: no performance summary, history too short", report.run_id);
                None
            }
        };

        log::info!("artifacts written to {}", run_dir.display());
        Ok(ArtifactPaths {
            run_dir,
            manifest: manifest_path,
            equity_csv,
            equity_parquet,
            daily_records_csv,
            stuck_events_csv,
            diagnostics_txt,
            performance_txt,
        })
    }
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}
