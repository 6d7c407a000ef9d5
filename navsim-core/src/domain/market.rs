//! Per-day market data as handed to the engine.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One symbol's daily bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub amount: f64,
    /// Date the values were observed on; earlier than the requested date
    /// when the provider fell back to the last available bar.
    pub observed_on: NaiveDate,
}

impl MarketSnapshot {
    /// A flat bar where every price equals `price`. Handy in tests and for
    /// index series that only carry a close.
    pub fn flat(price: f64, observed_on: NaiveDate) -> Self {
        Self {
            open: price,
            close: price,
            high: price,
            low: price,
            volume: 0.0,
            amount: 0.0,
            observed_on,
        }
    }

    pub fn is_fallback(&self, requested: NaiveDate) -> bool {
        self.observed_on < requested
    }
}

/// Symbol → snapshot for a single requested date.
///
/// Symbols a provider could not resolve are simply absent; callers that
/// need a symbol go through [`MarketData::require`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub date: NaiveDate,
    pub bars: HashMap<String, MarketSnapshot>,
}

impl MarketData {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            bars: HashMap::new(),
        }
    }

    pub fn insert(&mut self, symbol: impl Into<String>, snapshot: MarketSnapshot) {
        self.bars.insert(symbol.into(), snapshot);
    }

    pub fn get(&self, symbol: &str) -> Option<&MarketSnapshot> {
        self.bars.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.bars.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Snapshot for `symbol`, or `MissingMarketData` naming symbol and date.
    pub fn require(&self, symbol: &str) -> Result<&MarketSnapshot, EngineError> {
        self.bars
            .get(symbol)
            .ok_or_else(|| EngineError::MissingMarketData {
                symbol: symbol.to_string(),
                date: self.date,
            })
    }

    pub fn open(&self, symbol: &str) -> Result<f64, EngineError> {
        self.require(symbol).map(|s| s.open)
    }

    pub fn close(&self, symbol: &str) -> Result<f64, EngineError> {
        self.require(symbol).map(|s| s.close)
    }
}
