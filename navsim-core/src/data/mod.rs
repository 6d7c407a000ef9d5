//! Data layer: market data providers and the trading schedule.

pub mod memory;
pub mod parquet;
pub mod provider;
pub mod schedule;

pub use memory::InMemoryMarketData;
pub use parquet::{read_daily_bars, write_daily_bars, ParquetBenchmark, ParquetMarketData};
pub use provider::{BenchmarkProvider, DailyBar, DataError, MarketDataProvider};
pub use schedule::{ScheduleDay, ScheduleError, TradingDayRow, TradingSchedule};
