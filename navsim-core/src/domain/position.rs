use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shares per board lot.
pub const LOT_SIZE: u64 = 100;

/// Why a held position could not be sold on its scheduled sell day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StuckCause {
    #[default]
    None,
    Suspension,
    LimitDown,
}

impl std::fmt::Display for StuckCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StuckCause::None => "none",
            StuckCause::Suspension => "suspension",
            StuckCause::LimitDown => "limit_down",
        };
        f.write_str(s)
    }
}

/// A holding created on a buy day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub open_buy_price: f64,
    /// Close on the buy day.
    pub entry_close: f64,
    /// Always a multiple of [`LOT_SIZE`].
    pub volume: u64,
    pub stuck_cause: StuckCause,
    pub suspension_end_date: Option<NaiveDate>,
}

impl Position {
    pub fn new(symbol: impl Into<String>, open_buy_price: f64, entry_close: f64, volume: u64) -> Self {
        Self {
            symbol: symbol.into(),
            open_buy_price,
            entry_close,
            volume,
            stuck_cause: StuckCause::None,
            suspension_end_date: None,
        }
    }

    pub fn market_value(&self, close: f64) -> f64 {
        self.volume as f64 * close
    }
}
