//! Backtesting engine: the daily BUY / HOLD / SELL state machine and its
//! liability model.
//!
//! Each calendar day of the schedule runs one pass:
//!
//! 1. Classify the day from its first/last trading day flags
//! 2. Trade: allocate on buy days, release sellable holdings on sell days
//! 3. Mark-to-market at the close
//! 4. Accrue the day's liabilities; settle them in cash on sell days

pub mod day_type;
pub mod diagnostics;
pub mod liability;
pub mod loop_runner;
pub mod state;

pub use day_type::DayType;
pub use diagnostics::{DailyRecord, Diagnostics, StuckEvent};
pub use liability::LiabilityManager;
pub use loop_runner::BacktestEngine;
pub use state::{EquityPoint, RunResult};
