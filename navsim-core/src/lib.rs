//! NavSim Core: ledger, fee schedules, lot allocation, liability accrual and the
//! day-by-day backtest state machine.
//!
//! This crate contains the heart of the simulator:
//! - Domain types (positions, market snapshots, the ledger account)
//! - Buy/sell/liability fee schedules and the fee arithmetic
//! - Fee-aware, lot-rounded equal-weight allocation
//! - Daily operating-fee and capital-gains-tax accrual
//! - The BUY / HOLD / SELL day state machine with stuck-position carry-forward
//! - Schedule loading and market data providers

pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fees;
pub mod position_management;

pub use error::EngineError;
