//! Fatal engine errors.
//!
//! The simulator has no tolerance for continuing on a corrupted ledger: every
//! variant here aborts the run and names the offending symbol and/or date.

use chrono::NaiveDate;
use thiserror::Error;

use crate::data::DataError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no market data for {symbol} on {date}, check the market data collection")]
    MissingMarketData { symbol: String, date: NaiveDate },

    #[error("cannot resolve the exchange of '{symbol}': expected CODE.EXCHANGE, e.g. 600519.SH or 000001.SZ")]
    UnresolvedExchange { symbol: String },

    #[error("position {symbol} was kept as stuck on {date} without a stuck cause")]
    UnknownStuckCause { symbol: String, date: NaiveDate },

    #[error("invalid day type on {date}: first_trading_day={first}, last_trading_day={last}")]
    InvalidDayType { date: NaiveDate, first: u8, last: u8 },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}
