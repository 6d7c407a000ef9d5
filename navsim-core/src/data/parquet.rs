//! Parquet-backed market and index data.
//!
//! Layout: `{dir}/{SYMBOL}.parquet`, one file per symbol, columns
//! `date` (Date), `open`, `high`, `low`, `close`, `volume`, `amount`.
//!
//! Files are read once on first use and cached. A file with any zero, null
//! or non-finite price is rejected outright. A missing file leaves the symbol out of snapshots.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use polars::prelude::*;

use super::provider::{
    resolve_bar, resolve_series, BenchmarkProvider, DailyBar, DataError, MarketDataProvider,
};
use crate::domain::MarketData;

const COLUMNS: [&str; 7] = ["date", "open", "high", "low", "close", "volume", "amount"];

type SeriesCache = HashMap<String, Option<Arc<Vec<DailyBar>>>>;

/// Per-symbol Parquet store with an in-memory cache.
pub struct ParquetMarketData {
    dir: PathBuf,
    cache: Mutex<SeriesCache>,
}

impl ParquetMarketData {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn symbol_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.parquet"))
    }

    /// Full history of `symbol`, or `None` when no file exists.
    pub fn load(&self, symbol: &str) -> Result<Option<Arc<Vec<DailyBar>>>, DataError> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| DataError::Other("market data cache lock poisoned".into()))?;
        if let Some(entry) = cache.get(symbol) {
            return Ok(entry.clone());
        }

        let path = self.symbol_path(symbol);
        let entry = if path.exists() {
            let bars = read_daily_bars(&path, symbol)?;
            log::debug!("loaded {} bars for {symbol} from {}", bars.len(), path.display());
            Some(Arc::new(bars))
        } else {
            log::debug!("no data file for {symbol} at {}", path.display());
            None
        };
        cache.insert(symbol.to_string(), entry.clone());
        Ok(entry)
    }
}

impl MarketDataProvider for ParquetMarketData {
    fn snapshot(&self, symbols: &[String], date: NaiveDate) -> Result<MarketData, DataError> {
        let mut md = MarketData::new(date);
        for symbol in symbols {
            if let Some(bars) = self.load(symbol)? {
                if let Some(snap) = resolve_bar(symbol, &bars, date) {
                    md.insert(symbol.clone(), snap);
                }
            }
        }
        Ok(md)
    }
}

/// Index closes from a directory laid out like [`ParquetMarketData`].
pub struct ParquetBenchmark {
    store: ParquetMarketData,
}

impl ParquetBenchmark {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            store: ParquetMarketData::new(dir),
        }
    }
}

impl BenchmarkProvider for ParquetBenchmark {
    fn series(
        &self,
        dates: &[NaiveDate],
        index_symbol: &str,
    ) -> Result<BTreeMap<NaiveDate, f64>, DataError> {
        match self.store.load(index_symbol)? {
            Some(bars) => Ok(resolve_series(&bars, dates)),
            None => {
                log::warn!("no index file for {index_symbol}, benchmark series is empty");
                Ok(BTreeMap::new())
            }
        }
    }
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

// 1970-01-01, the zero of Polars' Date physical type.
fn epoch() -> NaiveDate {
    NaiveDate::default()
}

/// Write bars to `path` in the layout the readers expect.
pub fn write_daily_bars(path: &Path, bars: &[DailyBar]) -> Result<(), DataError> {
    let dates: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch()).num_days() as i32)
        .collect();
    let pick = |f: fn(&DailyBar) -> f64| bars.iter().map(f).collect::<Vec<f64>>();

    let mut df = DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| DataError::ParquetError(format!("date cast: {e}")))?,
        Column::new("open".into(), pick(|b| b.open)),
        Column::new("high".into(), pick(|b| b.high)),
        Column::new("low".into(), pick(|b| b.low)),
        Column::new("close".into(), pick(|b| b.close)),
        Column::new("volume".into(), pick(|b| b.volume)),
        Column::new("amount".into(), pick(|b| b.amount)),
    ])
    .map_err(|e| DataError::ParquetError(format!("dataframe creation: {e}")))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| DataError::ParquetError(format!("create dir: {e}")))?;
    }
    let file =
        fs::File::create(path).map_err(|e| DataError::ParquetError(format!("create file: {e}")))?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| DataError::ParquetError(format!("write parquet: {e}")))?;
    Ok(())
}

/// Read, validate and sort one symbol file.
pub fn read_daily_bars(path: &Path, symbol: &str) -> Result<Vec<DailyBar>, DataError> {
    let invalid = |reason: String| DataError::ValidationError {
        symbol: symbol.to_string(),
        reason,
    };

    let file = fs::File::open(path).map_err(|e| DataError::ParquetError(format!("open: {e}")))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::ParquetError(format!("read: {e}")))?;

    for name in COLUMNS {
        if df.column(name).is_err() {
            return Err(invalid(format!("missing column '{name}'")));
        }
    }

    let mut bars = dataframe_to_bars(&df)?;
    if let Some(bad) = bars.iter().find(|b| b.has_invalid_price()) {
        return Err(invalid(format!(
            "invalid price on {} (open {}, high {}, low {}, close {})",
            bad.date, bad.open, bad.high, bad.low, bad.close
        )));
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, DataError> {
    let col = df
        .column(name)
        .and_then(|c| c.cast(&DataType::Float64))
        .map_err(|e| DataError::ParquetError(format!("{name} column: {e}")))?;
    let ca = col
        .f64()
        .map_err(|e| DataError::ParquetError(format!("{name} column type: {e}")))?;
    // Nulls become NaN here and fail price validation in `read_daily_bars`.
    Ok(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

fn dataframe_to_bars(df: &DataFrame) -> Result<Vec<DailyBar>, DataError> {
    let dates = df
        .column("date")
        .and_then(|c| c.cast(&DataType::Date))
        .map_err(|e| DataError::ParquetError(format!("date column: {e}")))?;
    let date_ca = dates
        .date()
        .map_err(|e| DataError::ParquetError(format!("date column type: {e}")))?;

    let open = float_column(df, "open")?;
    let high = float_column(df, "high")?;
    let low = float_column(df, "low")?;
    let close = float_column(df, "close")?;
    let volume = float_column(df, "volume")?;
    let amount = float_column(df, "amount")?;

    (0..df.height())
        .map(|i| {
            let days = date_ca
                .get(i)
                .ok_or_else(|| DataError::ParquetError(format!("null date at row {i}")))?;
            Ok(DailyBar {
                date: epoch() + chrono::Duration::days(days as i64),
                open: open[i],
                high: high[i],
                low: low[i],
                close: close[i],
                volume: volume[i],
                amount: amount[i],
            })
        })
        .collect()
}
