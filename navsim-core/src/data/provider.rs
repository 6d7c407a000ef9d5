//! Market data provider traits and structured error types.
//!
//! The engine only sees [`MarketDataProvider`]; reporting additionally uses
//! [`BenchmarkProvider`]. Both are synchronous and may be implemented over
//! Parquet files, memory, or anything else that can answer "price of X on D".

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{MarketData, MarketSnapshot};

/// One stored daily bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub amount: f64,
}

impl DailyBar {
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            open: self.open,
            close: self.close,
            high: self.high,
            low: self.low,
            volume: self.volume,
            amount: self.amount,
            observed_on: self.date,
        }
    }

    /// True when any price field is zero, null (read as NaN) or infinite,
    /// which marks a corrupt export.
    pub fn has_invalid_price(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .any(|&v| !v.is_finite() || v == 0.0)
    }
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("parquet I/O error: {0}")]
    ParquetError(String),

    #[error("validation error for '{symbol}': {reason}")]
    ValidationError { symbol: String, reason: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Source of per-day symbol snapshots.
///
/// Symbols that cannot be resolved are left out of the returned map; the
/// engine decides whether their absence is fatal.
pub trait MarketDataProvider: Send + Sync {
    fn snapshot(&self, symbols: &[String], date: NaiveDate) -> Result<MarketData, DataError>;
}

/// Source of index closes, used by reporting only.
pub trait BenchmarkProvider: Send + Sync {
    fn series(
        &self,
        dates: &[NaiveDate],
        index_symbol: &str,
    ) -> Result<BTreeMap<NaiveDate, f64>, DataError>;
}

/// Last bar dated on or before `date` in a date-sorted slice.
pub fn bar_on_or_before(bars: &[DailyBar], date: NaiveDate) -> Option<&DailyBar> {
    let idx = bars.partition_point(|b| b.date <= date);
    if idx == 0 {
        None
    } else {
        bars.get(idx - 1)
    }
}

/// Resolve `date` against `bars` with the last-available fallback, logging
/// when a fallback is used.
pub(crate) fn resolve_bar(
    symbol: &str,
    bars: &[DailyBar],
    date: NaiveDate,
) -> Option<MarketSnapshot> {
    let bar = bar_on_or_before(bars, date)?;
    if bar.date < date {
        log::warn!(
            "{symbol}: no bar on {date}, using last available bar from {}",
            bar.date
        );
    }
    Some(bar.snapshot())
}

/// Closes for each requested date using the same fallback; dates with no
/// earlier bar are skipped.
pub(crate) fn resolve_series(bars: &[DailyBar], dates: &[NaiveDate]) -> BTreeMap<NaiveDate, f64> {
    dates
        .iter()
        .filter_map(|d| bar_on_or_before(bars, *d).map(|b| (*d, b.close)))
        .collect()
}
