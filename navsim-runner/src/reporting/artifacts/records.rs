//! Per-day records and stuck events (CSV).

use anyhow::{Context, Result};
use navsim_core::engine::{DailyRecord, Diagnostics};
use std::path::Path;

pub fn write_daily_records_csv(path: &Path, records: &[DailyRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create daily records CSV {}", path.display()))?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write daily record for {}", record.date))?;
    }
    writer.flush().context("Failed to flush daily records CSV")?;
    Ok(())
}

/// `date,symbol,cause`, date ordered.
pub fn write_stuck_events_csv(path: &Path, diagnostics: &Diagnostics) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create stuck events CSV {}", path.display()))?;
    writer.write_record(["date", "symbol", "cause"])?;
    for event in diagnostics.stuck_events() {
        writer.write_record([
            event.date.format("%Y%m%d").to_string(),
            event.symbol.clone(),
            event.cause.to_string(),
        ])?;
    }
    writer.flush().context("Failed to flush stuck events CSV")?;
    Ok(())
}
