//! Equity history export (CSV/Parquet).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use navsim_core::engine::EquityPoint;
use polars::prelude::{Column, DataFrame, DataType, ParquetWriter};
use std::fs::File;
use std::path::Path;

/// `date,nav` with `YYYYMMDD` date keys.
pub fn write_equity_csv(path: &Path, equity: &[EquityPoint]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create equity CSV {}", path.display()))?;
    writer.write_record(["date", "nav"])?;
    for point in equity {
        writer.write_record([point.date_key(), format!("{:.4}", point.nav)])?;
    }
    writer.flush().context("Failed to flush equity CSV")?;
    Ok(())
}

pub fn write_equity_parquet(path: &Path, equity: &[EquityPoint]) -> Result<()> {
    let epoch = NaiveDate::default();
    let dates: Vec<i32> = equity
        .iter()
        .map(|p| (p.date - epoch).num_days() as i32)
        .collect();
    let navs: Vec<f64> = equity.iter().map(|p| p.nav).collect();

    let mut df = DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .context("Failed to cast equity dates")?,
        Column::new("nav".into(), navs),
    ])
    .context("Failed to build equity dataframe")?;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create equity parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("Failed to write equity parquet")?;
    Ok(())
}
