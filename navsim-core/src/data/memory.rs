//! In-memory provider with the same fallback contract as the Parquet one.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use super::provider::{
    resolve_bar, resolve_series, BenchmarkProvider, DailyBar, DataError, MarketDataProvider,
};
use crate::domain::MarketData;

#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketData {
    bars: HashMap<String, Vec<DailyBar>>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the history of `symbol`; bars are sorted by date.
    pub fn insert_series(&mut self, symbol: impl Into<String>, mut bars: Vec<DailyBar>) {
        bars.sort_by_key(|b| b.date);
        self.bars.insert(symbol.into(), bars);
    }

    /// Append or overwrite a single day.
    pub fn insert_bar(&mut self, symbol: impl Into<String>, bar: DailyBar) {
        let series = self.bars.entry(symbol.into()).or_default();
        match series.binary_search_by_key(&bar.date, |b| b.date) {
            Ok(i) => series[i] = bar,
            Err(i) => series.insert(i, bar),
        }
    }

    pub fn with_bar(mut self, symbol: impl Into<String>, bar: DailyBar) -> Self {
        self.insert_bar(symbol, bar);
        self
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.bars.keys().map(String::as_str)
    }
}

impl MarketDataProvider for InMemoryMarketData {
    fn snapshot(&self, symbols: &[String], date: NaiveDate) -> Result<MarketData, DataError> {
        let mut md = MarketData::new(date);
        for symbol in symbols {
            if let Some(snap) = self
                .bars
                .get(symbol)
                .and_then(|bars| resolve_bar(symbol, bars, date))
            {
                md.insert(symbol.clone(), snap);
            }
        }
        Ok(md)
    }
}

impl BenchmarkProvider for InMemoryMarketData {
    fn series(
        &self,
        dates: &[NaiveDate],
        index_symbol: &str,
    ) -> Result<BTreeMap<NaiveDate, f64>, DataError> {
        Ok(self
            .bars
            .get(index_symbol)
            .map(|bars| resolve_series(bars, dates))
            .unwrap_or_default())
    }
}
